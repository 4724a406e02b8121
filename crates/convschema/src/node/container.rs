use convschema_meta::TypeId;
use derive_more::Display;
use serde::Serialize;

///
/// ContainerKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ContainerKind {
    EntitySet,
    Singleton,
}

///
/// ContainerElement
///
/// A named entity set or singleton exposing one entity type.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContainerElement {
    pub name: String,
    pub kind: ContainerKind,
    pub entity_type: TypeId,
}

impl ContainerElement {
    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        matches!(self.kind, ContainerKind::Singleton)
    }
}

///
/// NavigationBinding
///
/// Target container for one navigation path reachable from a container.
/// Paths through derived types start with the derived type's full name,
/// paths through complex properties list each property segment.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NavigationBinding {
    pub source: String,
    pub path: String,
    pub declaring_type: TypeId,
    pub property: String,
    pub target: String,
    pub target_kind: ContainerKind,
    pub added_explicitly: bool,
}
