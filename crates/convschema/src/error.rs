use crate::node::StructuralKind;
use convschema_meta::TypeId;
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Coarse classification of build failures. Configuration errors are
/// argument-shaped and caller-correctable; model errors describe a schema
/// that cannot be made consistent.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidConfiguration,
    InvalidModel,
}

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl BuildError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Configuration(_) => ErrorClass::InvalidConfiguration,
            Self::Model(_) => ErrorClass::InvalidModel,
        }
    }
}

///
/// ConfigurationError
///

#[derive(Debug, ThisError)]
pub enum ConfigurationError {
    #[error("type '{ty}' is not known to the metadata source")]
    UnknownType { ty: TypeId },

    #[error("type '{ty}' is an enumeration and cannot be configured as a structural type")]
    NotStructural { ty: TypeId },

    #[error("member '{property}' of '{ty}' has a value type with no schema representation")]
    UnsupportedProperty { ty: TypeId, property: String },

    #[error(
        "type '{ty}' cannot be configured as {requested} because it was already configured as {prior}"
    )]
    KindConflict {
        ty: TypeId,
        prior: StructuralKind,
        requested: StructuralKind,
    },

    #[error(
        "type '{ty}' already has dynamic property container '{first}'; '{second}' cannot be added"
    )]
    DuplicateDynamicContainer {
        ty: TypeId,
        first: String,
        second: String,
    },

    #[error(
        "complex type '{ty}' is recursive: property '{property}' of '{declaring_type}' loops back to it"
    )]
    RecursiveComplexType {
        ty: TypeId,
        declaring_type: TypeId,
        property: String,
    },

    #[error("type '{ty}' has no member named '{property}'")]
    UnknownProperty { ty: TypeId, property: String },

    #[error("property '{property}' of '{ty}' cannot be configured as {kind}")]
    InvalidPropertyKind {
        ty: TypeId,
        property: String,
        kind: String,
    },

    #[error("key property '{property}' of '{ty}' must be a primitive or enum value")]
    InvalidKeyProperty { ty: TypeId, property: String },

    #[error("complex type '{ty}' cannot declare key property '{property}'")]
    KeyOnComplexType { ty: TypeId, property: String },

    #[error(
        "foreign key '{foreign_key}' of navigation '{property}' on '{ty}' does not name a property"
    )]
    ForeignKeyNotFound {
        ty: TypeId,
        property: String,
        foreign_key: String,
    },

    #[error("type '{ty}' cannot derive from '{base}': the base type chain loops")]
    InheritanceCycle { ty: TypeId, base: TypeId },

    #[error("container name '{name}' is registered more than once")]
    DuplicateContainer { name: String },

    #[error("container '{name}' is not registered")]
    UnknownContainer { name: String },

    #[error("container '{container}' exposes ignored type '{ty}'")]
    IgnoredTypeExposed { container: String, ty: TypeId },

    #[error("container '{container}' exposes '{ty}', which is not an entity type")]
    ContainerTypeNotEntity { container: String, ty: TypeId },
}

///
/// ModelError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ModelError {
    #[error(
        "the kind of base type '{base}' cannot be determined: derived type '{entity}' is an entity type but '{complex}' is a complex type"
    )]
    AmbiguousBaseKind {
        base: TypeId,
        entity: TypeId,
        complex: TypeId,
    },

    #[error(
        "entity type '{ty}' cannot declare a key because its base type '{ancestor}' already declares one"
    )]
    DuplicateKey { ty: TypeId, ancestor: TypeId },

    #[error("container '{container}' exposes entity type '{ty}', which has no key")]
    MissingKey { container: String, ty: TypeId },
}
