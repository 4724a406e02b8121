use crate::{TypeDescriptor, TypeId};
use std::collections::{BTreeMap, BTreeSet};

///
/// TypeMetadataSource
///
/// Read-only oracle the builder queries for type descriptions. The builder
/// never discovers types on its own; anything it learns about derived
/// types comes from `types()`.
///

pub trait TypeMetadataSource {
    /// Look up one descriptor by identity.
    fn descriptor(&self, id: &TypeId) -> Option<&TypeDescriptor>;

    /// Every descriptor belonging to the registered metadata namespace(s),
    /// in a stable order.
    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_>;

    /// Types whose declared base is `base`.
    fn derived_types(&self, base: &TypeId) -> Vec<&TypeDescriptor> {
        self.types()
            .filter(|d| d.base.as_ref() == Some(base))
            .collect()
    }

    /// Ancestors of `id`, nearest first. Stops at the first unknown
    /// ancestor and never revisits a type.
    fn base_chain(&self, id: &TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::from([id.clone()]);
        let mut current = self.descriptor(id).and_then(|d| d.base.clone());

        while let Some(base) = current {
            if !seen.insert(base.clone()) {
                break;
            }
            current = self.descriptor(&base).and_then(|d| d.base.clone());
            chain.push(base);
        }

        chain
    }
}

///
/// TypeCatalog
///
/// In-memory metadata source keyed by type identity.
///

#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: BTreeMap<TypeId, TypeDescriptor>,
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a descriptor.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.id.clone(), descriptor);
    }

    #[must_use]
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeDescriptor> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for descriptor in iter {
            catalog.insert(descriptor);
        }
        catalog
    }
}

impl TypeMetadataSource for TypeCatalog {
    fn descriptor(&self, id: &TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id)
    }

    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_> {
        Box::new(self.types.values())
    }
}
