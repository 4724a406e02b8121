use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid builder configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

///
/// PropertyCase
///
/// Casing applied to property names that were not explicitly renamed.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCase {
    #[default]
    AsDeclared,
    LowerCamel,
}

impl PropertyCase {
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::AsDeclared => name.to_string(),
            Self::LowerCamel => name.to_case(Case::Camel),
        }
    }
}

///
/// BuilderConfig
///
/// Knobs for one schema build. Every field has a default, so an empty
/// TOML document is a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    pub namespace: String,
    pub container_name: String,
    pub discover_derived_types: bool,
    pub prune_unreachable: bool,
    pub property_case: PropertyCase,
}

impl BuilderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            namespace: "Default".to_string(),
            container_name: "Container".to_string(),
            discover_derived_types: true,
            prune_unreachable: true,
            property_case: PropertyCase::AsDeclared,
        }
    }
}
