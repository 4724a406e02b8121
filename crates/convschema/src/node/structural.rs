use crate::node::PropertyConfiguration;
use convschema_meta::TypeId;
use derive_more::Display;
use serde::Serialize;

///
/// StructuralKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum StructuralKind {
    Entity,
    Complex,
}

///
/// KeySource
///
/// Where a locally declared key came from.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum KeySource {
    Explicit,
    Annotation,
    Convention,
}

///
/// EntityKey
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntityKey {
    pub properties: Vec<String>,
    pub source: KeySource,
}

///
/// TypeKind
///
/// Entity types optionally carry the key they declare themselves; keys
/// inherited from a base type live on that base.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TypeKind {
    Entity { key: Option<EntityKey> },
    Complex,
}

///
/// StructuralTypeConfiguration
///
/// One configuration per registered or discovered type. The kind is fixed
/// when the configuration is created; the property list only holds what
/// this level declares.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StructuralTypeConfiguration {
    pub id: TypeId,
    pub name: String,
    pub namespace: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeId>,

    pub is_abstract: bool,
    pub added_explicitly: bool,

    /// True when this type or an ancestor has a dynamic property container.
    pub is_open: bool,

    /// Container declared by this level, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_container: Option<String>,

    pub properties: Vec<PropertyConfiguration>,
    kind: TypeKind,
}

impl StructuralTypeConfiguration {
    pub(crate) fn new(id: TypeId, name: String, namespace: String, kind: StructuralKind) -> Self {
        let kind = match kind {
            StructuralKind::Entity => TypeKind::Entity { key: None },
            StructuralKind::Complex => TypeKind::Complex,
        };

        Self {
            id,
            name,
            namespace,
            base: None,
            is_abstract: false,
            added_explicitly: false,
            is_open: false,
            dynamic_container: None,
            properties: Vec::new(),
            kind,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StructuralKind {
        match self.kind {
            TypeKind::Entity { .. } => StructuralKind::Entity,
            TypeKind::Complex => StructuralKind::Complex,
        }
    }

    #[must_use]
    pub const fn type_kind(&self) -> &TypeKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self.kind, TypeKind::Entity { .. })
    }

    #[must_use]
    pub const fn is_complex(&self) -> bool {
        matches!(self.kind, TypeKind::Complex)
    }

    /// Key declared at this level (entities only).
    #[must_use]
    pub const fn declared_key(&self) -> Option<&EntityKey> {
        match &self.kind {
            TypeKind::Entity { key } => key.as_ref(),
            TypeKind::Complex => None,
        }
    }

    /// Set the key declared at this level. Returns false for complex types,
    /// which cannot carry one.
    pub fn set_key(&mut self, properties: Vec<String>, source: KeySource) -> bool {
        match &mut self.kind {
            TypeKind::Entity { key } => {
                *key = Some(EntityKey { properties, source });
                true
            }
            TypeKind::Complex => false,
        }
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyConfiguration> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyConfiguration> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    #[must_use]
    pub fn property_by_member(&self, member: &str) -> Option<&PropertyConfiguration> {
        self.properties.iter().find(|p| p.member == member)
    }

    pub fn navigation_properties(&self) -> impl Iterator<Item = &PropertyConfiguration> {
        self.properties.iter().filter(|p| p.kind.is_navigation())
    }
}
