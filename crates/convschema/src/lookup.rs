use crate::node::{EntityKey, PropertyConfiguration, StructuralTypeConfiguration};
use convschema_meta::TypeId;
use std::collections::BTreeSet;

///
/// StructuralLookup
///
/// Read access shared by the in-progress registry and the finished graph.
/// Per-level property lists are resolved into full views by walking the
/// base chain at read time.
///

pub trait StructuralLookup {
    fn structural(&self, id: &TypeId) -> Option<&StructuralTypeConfiguration>;

    /// `id` followed by its ancestors, nearest first.
    fn base_chain(&self, id: &TypeId) -> Vec<&StructuralTypeConfiguration> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = self.structural(id);

        while let Some(node) = current {
            if !seen.insert(&node.id) {
                break;
            }
            chain.push(node);
            current = node.base.as_ref().and_then(|base| self.structural(base));
        }

        chain
    }

    /// Number of base-type steps from `id` up to `ancestor`, if it is one.
    fn ancestor_distance(&self, id: &TypeId, ancestor: &TypeId) -> Option<usize> {
        self.base_chain(id)
            .iter()
            .position(|node| &node.id == ancestor)
    }

    /// The nearest key in the chain, with the type that declares it.
    fn resolved_key(&self, id: &TypeId) -> Option<(&StructuralTypeConfiguration, &EntityKey)> {
        self.base_chain(id)
            .into_iter()
            .find_map(|node| node.declared_key().map(|key| (node, key)))
    }

    /// Every property visible on `id`, base-most level first.
    fn all_properties(&self, id: &TypeId) -> Vec<&PropertyConfiguration> {
        let mut chain = self.base_chain(id);
        chain.reverse();

        chain
            .into_iter()
            .flat_map(|node| node.properties.iter())
            .collect()
    }

    /// Find a visible property by schema name, with the level declaring it.
    fn find_property(
        &self,
        id: &TypeId,
        name: &str,
    ) -> Option<(&StructuralTypeConfiguration, &PropertyConfiguration)> {
        self.base_chain(id)
            .into_iter()
            .find_map(|node| node.property(name).map(|p| (node, p)))
    }
}
