use crate::{
    lookup::StructuralLookup,
    node::{
        ContainerElement, ContainerKind, EntityKey, EnumTypeConfiguration, NavigationBinding,
        PropertyConfiguration, PropertyKind, StructuralTypeConfiguration,
    },
};
use convschema_meta::TypeId;
use serde::Serialize;
use std::collections::BTreeMap;

///
/// SchemaElement
///
/// One top-level element of the schema namespace.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum SchemaElement<'a> {
    Entity(&'a StructuralTypeConfiguration),
    Complex(&'a StructuralTypeConfiguration),
    Enum(&'a EnumTypeConfiguration),
}

impl SchemaElement<'_> {
    #[must_use]
    pub const fn id(&self) -> &TypeId {
        match self {
            Self::Entity(node) | Self::Complex(node) => &node.id,
            Self::Enum(node) => &node.id,
        }
    }
}

///
/// SchemaGraph
///
/// The finished, read-only schema. Property lists stay per level; full
/// views are resolved through the base chain.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SchemaGraph {
    namespace: String,
    container_name: String,
    types: BTreeMap<TypeId, StructuralTypeConfiguration>,
    enums: BTreeMap<TypeId, EnumTypeConfiguration>,
    containers: Vec<ContainerElement>,
    bindings: Vec<NavigationBinding>,
}

impl SchemaGraph {
    pub(crate) const fn new(
        namespace: String,
        container_name: String,
        types: BTreeMap<TypeId, StructuralTypeConfiguration>,
        enums: BTreeMap<TypeId, EnumTypeConfiguration>,
        containers: Vec<ContainerElement>,
        bindings: Vec<NavigationBinding>,
    ) -> Self {
        Self {
            namespace,
            container_name,
            types,
            enums,
            containers,
            bindings,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    //
    // types
    //

    #[must_use]
    pub fn structural_type(&self, id: &TypeId) -> Option<&StructuralTypeConfiguration> {
        self.types.get(id)
    }

    pub fn structural_types(&self) -> impl Iterator<Item = &StructuralTypeConfiguration> {
        self.types.values()
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &StructuralTypeConfiguration> {
        self.types.values().filter(|node| node.is_entity())
    }

    pub fn complex_types(&self) -> impl Iterator<Item = &StructuralTypeConfiguration> {
        self.types.values().filter(|node| node.is_complex())
    }

    #[must_use]
    pub fn enum_type(&self, id: &TypeId) -> Option<&EnumTypeConfiguration> {
        self.enums.get(id)
    }

    pub fn enum_types(&self) -> impl Iterator<Item = &EnumTypeConfiguration> {
        self.enums.values()
    }

    /// Structural and enum types, in id order. The entity container is not
    /// an element here.
    pub fn schema_elements(&self) -> impl Iterator<Item = SchemaElement<'_>> {
        let structural = self.types.values().map(|node| {
            if node.is_entity() {
                SchemaElement::Entity(node)
            } else {
                SchemaElement::Complex(node)
            }
        });

        structural.chain(self.enums.values().map(SchemaElement::Enum))
    }

    /// Every property of `id`, base-most level first.
    #[must_use]
    pub fn properties_of(&self, id: &TypeId) -> Vec<&PropertyConfiguration> {
        self.all_properties(id)
    }

    /// The key of `id`, resolved through its ancestors.
    #[must_use]
    pub fn key_of(&self, id: &TypeId) -> Option<&EntityKey> {
        self.resolved_key(id).map(|(_, key)| key)
    }

    /// Direct children of `id`.
    pub fn derived_types<'a>(
        &'a self,
        id: &'a TypeId,
    ) -> impl Iterator<Item = &'a StructuralTypeConfiguration> + 'a {
        self.types
            .values()
            .filter(move |node| node.base.as_ref() == Some(id))
    }

    #[must_use]
    pub fn is_open(&self, id: &TypeId) -> bool {
        self.types.get(id).is_some_and(|node| node.is_open)
    }

    /// Name of the dynamic property container visible on `id`, own or
    /// inherited.
    #[must_use]
    pub fn dynamic_container(&self, id: &TypeId) -> Option<&str> {
        self.base_chain(id)
            .into_iter()
            .find_map(|node| {
                node.properties
                    .iter()
                    .find(|p| p.kind == PropertyKind::DynamicPropertyContainer)
            })
            .map(|p| p.name.as_str())
    }

    //
    // containers
    //

    #[must_use]
    pub fn containers(&self) -> &[ContainerElement] {
        &self.containers
    }

    #[must_use]
    pub fn entity_set(&self, name: &str) -> Option<&ContainerElement> {
        self.container(name, ContainerKind::EntitySet)
    }

    #[must_use]
    pub fn singleton(&self, name: &str) -> Option<&ContainerElement> {
        self.container(name, ContainerKind::Singleton)
    }

    fn container(&self, name: &str, kind: ContainerKind) -> Option<&ContainerElement> {
        self.containers
            .iter()
            .find(|c| c.name == name && c.kind == kind)
    }

    #[must_use]
    pub fn bindings(&self) -> &[NavigationBinding] {
        &self.bindings
    }

    pub fn bindings_for<'a>(
        &'a self,
        container: &'a str,
    ) -> impl Iterator<Item = &'a NavigationBinding> + 'a {
        self.bindings.iter().filter(move |b| b.source == container)
    }

    #[must_use]
    pub fn binding(&self, container: &str, path: &str) -> Option<&NavigationBinding> {
        self.bindings
            .iter()
            .find(|b| b.source == container && b.path == path)
    }
}

impl StructuralLookup for SchemaGraph {
    fn structural(&self, id: &TypeId) -> Option<&StructuralTypeConfiguration> {
        self.types.get(id)
    }
}
