use crate::{
    lookup::StructuralLookup,
    node::{EnumTypeConfiguration, PropertyConfiguration, StructuralTypeConfiguration},
};
use convschema_meta::TypeId;
use std::collections::BTreeMap;

///
/// ModelRegistry
///
/// Structural and enum configurations of one build in progress. Handed to
/// the post-processing hook after conventions have run; whatever the hook
/// leaves here is taken as final.
///

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    types: BTreeMap<TypeId, StructuralTypeConfiguration>,
    enums: BTreeMap<TypeId, EnumTypeConfiguration>,
}

impl ModelRegistry {
    pub(crate) fn insert(&mut self, node: StructuralTypeConfiguration) {
        self.types.insert(node.id.clone(), node);
    }

    pub(crate) fn insert_enum(&mut self, node: EnumTypeConfiguration) {
        self.enums.insert(node.id.clone(), node);
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&TypeId) -> bool) {
        self.types.retain(|id, _| keep(id));
    }

    pub(crate) fn retain_enums(&mut self, mut keep: impl FnMut(&TypeId) -> bool) {
        self.enums.retain(|id, _| keep(id));
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        BTreeMap<TypeId, StructuralTypeConfiguration>,
        BTreeMap<TypeId, EnumTypeConfiguration>,
    ) {
        (self.types, self.enums)
    }

    #[must_use]
    pub fn get(&self, id: &TypeId) -> Option<&StructuralTypeConfiguration> {
        self.types.get(id)
    }

    pub fn get_mut(&mut self, id: &TypeId) -> Option<&mut StructuralTypeConfiguration> {
        self.types.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &TypeId) -> bool {
        self.types.contains_key(id)
    }

    /// Mutable access to one property, by owning type and schema name.
    pub fn property_mut(&mut self, id: &TypeId, name: &str) -> Option<&mut PropertyConfiguration> {
        self.types.get_mut(id)?.property_mut(name)
    }

    #[must_use]
    pub fn enum_type(&self, id: &TypeId) -> Option<&EnumTypeConfiguration> {
        self.enums.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructuralTypeConfiguration> {
        self.types.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StructuralTypeConfiguration> {
        self.types.values_mut()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumTypeConfiguration> {
        self.enums.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TypeId> {
        self.types.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Direct children of `id` in the configured hierarchy.
    pub fn derived_types<'a>(
        &'a self,
        id: &'a TypeId,
    ) -> impl Iterator<Item = &'a StructuralTypeConfiguration> + 'a {
        self.types
            .values()
            .filter(move |node| node.base.as_ref() == Some(id))
    }
}

impl StructuralLookup for ModelRegistry {
    fn structural(&self, id: &TypeId) -> Option<&StructuralTypeConfiguration> {
        self.types.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{KeySource, StructuralKind};

    fn node(id: &str, base: Option<&str>, kind: StructuralKind) -> StructuralTypeConfiguration {
        let id = TypeId::from(id);
        let mut node = StructuralTypeConfiguration::new(
            id.clone(),
            id.name().to_string(),
            "NS".to_string(),
            kind,
        );
        node.base = base.map(TypeId::from);
        node
    }

    #[test]
    fn resolved_key_walks_to_nearest_keyed_ancestor() {
        let mut registry = ModelRegistry::default();
        let mut root = node("NS.Root", None, StructuralKind::Entity);
        root.set_key(vec!["Id".to_string()], KeySource::Explicit);
        registry.insert(root);
        registry.insert(node("NS.Mid", Some("NS.Root"), StructuralKind::Entity));
        registry.insert(node("NS.Leaf", Some("NS.Mid"), StructuralKind::Entity));

        let (owner, key) = registry
            .resolved_key(&TypeId::from("NS.Leaf"))
            .expect("leaf should inherit the root key");
        assert_eq!(owner.id, TypeId::from("NS.Root"));
        assert_eq!(key.properties, vec!["Id".to_string()]);
        assert_eq!(
            registry.ancestor_distance(&TypeId::from("NS.Leaf"), &TypeId::from("NS.Root")),
            Some(2)
        );
    }

    #[test]
    fn base_chain_survives_cycles() {
        let mut registry = ModelRegistry::default();
        registry.insert(node("NS.A", Some("NS.B"), StructuralKind::Complex));
        registry.insert(node("NS.B", Some("NS.A"), StructuralKind::Complex));

        assert_eq!(registry.base_chain(&TypeId::from("NS.A")).len(), 2);
    }
}
