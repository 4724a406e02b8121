use convschema_meta::{Primitive, TypeId, ValueType};
use derive_more::Display;
use serde::Serialize;

///
/// PropertyKind
///
/// Schema classification of one property.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum PropertyKind {
    Primitive,
    Enum,
    Complex,
    Navigation,
    PrimitiveCollection,
    ComplexCollection,
    NavigationCollection,
    DynamicPropertyContainer,
}

impl PropertyKind {
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(self, Self::Navigation | Self::NavigationCollection)
    }

    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            Self::PrimitiveCollection | Self::ComplexCollection | Self::NavigationCollection
        )
    }

    // scalar values that may take part in a key
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        matches!(self, Self::Primitive | Self::Enum)
    }
}

///
/// ConcurrencyMode
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize)]
pub enum ConcurrencyMode {
    #[default]
    None,
    Fixed,
}

///
/// Multiplicity
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Multiplicity {
    One,
    ZeroOrOne,
    Many,
}

///
/// Capability
///
/// Query operations a property can be restricted from.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum Capability {
    Count,
    Expand,
    Filter,
    Navigate,
    Sort,
}

///
/// QueryCapabilities
///
/// Restriction flags; every capability is allowed until a flag is set.
///

#[expect(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct QueryCapabilities {
    pub not_countable: bool,
    pub not_expandable: bool,
    pub not_filterable: bool,
    pub not_navigable: bool,
    pub not_sortable: bool,
}

impl QueryCapabilities {
    pub const fn restrict(&mut self, capability: Capability) {
        match capability {
            Capability::Count => self.not_countable = true,
            Capability::Expand => self.not_expandable = true,
            Capability::Filter => self.not_filterable = true,
            Capability::Navigate => self.not_navigable = true,
            Capability::Sort => self.not_sortable = true,
        }
    }

    #[must_use]
    pub const fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Count => !self.not_countable,
            Capability::Expand => !self.not_expandable,
            Capability::Filter => !self.not_filterable,
            Capability::Navigate => !self.not_navigable,
            Capability::Sort => !self.not_sortable,
        }
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        !(self.not_countable
            || self.not_expandable
            || self.not_filterable
            || self.not_navigable
            || self.not_sortable)
    }
}

///
/// Navigation
///
/// Relationship details carried by navigation properties.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Navigation {
    pub multiplicity: Multiplicity,

    /// Dependent-side properties holding the principal key, if discovered.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<String>,

    /// Principal key properties the foreign keys refer to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub principal_keys: Vec<String>,

    pub auto_expand: bool,
}

///
/// PropertyConfiguration
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PropertyConfiguration {
    /// Schema name.
    pub name: String,

    /// Member name on the described type.
    pub member: String,

    /// Type whose descriptor declares the member. Differs from the owning
    /// configuration when an unmapped ancestor was flattened into it.
    pub declared_on: TypeId,

    pub value_type: ValueType,
    pub kind: PropertyKind,

    /// Element type for enum, complex and navigation properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TypeId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Primitive>,

    pub nullable: bool,
    pub added_explicitly: bool,
    pub concurrency: ConcurrencyMode,
    pub capabilities: QueryCapabilities,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<Navigation>,
}

impl PropertyConfiguration {
    #[must_use]
    pub fn multiplicity(&self) -> Option<Multiplicity> {
        self.navigation.as_ref().map(|n| n.multiplicity)
    }

    #[must_use]
    pub fn foreign_keys(&self) -> &[String] {
        self.navigation
            .as_ref()
            .map_or(&[], |n| n.foreign_keys.as_slice())
    }
}
