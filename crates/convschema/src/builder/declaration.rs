use crate::node::{Capability, ConcurrencyMode, PropertyKind, QueryCapabilities, StructuralKind};
use convschema_meta::TypeId;
use std::collections::BTreeSet;

///
/// BaseDeclaration
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum BaseDeclaration {
    #[default]
    Inferred,
    Explicit(Option<TypeId>),
}

///
/// TypeDeclaration
///
/// Caller-side configuration for one structural type. Anything set here
/// wins over convention.
///

#[derive(Clone, Debug)]
pub struct TypeDeclaration {
    pub(crate) id: TypeId,
    pub(crate) kind: StructuralKind,
    pub(crate) keys: Vec<String>,
    pub(crate) base: BaseDeclaration,
    pub(crate) is_abstract: Option<bool>,
    pub(crate) properties: Vec<PropertyDeclaration>,
    pub(crate) ignored_properties: BTreeSet<String>,
}

impl TypeDeclaration {
    pub(crate) const fn new(id: TypeId, kind: StructuralKind) -> Self {
        Self {
            id,
            kind,
            keys: Vec::new(),
            base: BaseDeclaration::Inferred,
            is_abstract: None,
            properties: Vec::new(),
            ignored_properties: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &TypeId {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> StructuralKind {
        self.kind
    }

    /// Add a member to the key, in order.
    pub fn key(&mut self, member: &str) -> &mut Self {
        if !self.keys.iter().any(|k| k == member) {
            self.keys.push(member.to_string());
        }
        self
    }

    pub fn base(&mut self, base: impl Into<TypeId>) -> &mut Self {
        self.base = BaseDeclaration::Explicit(Some(base.into()));
        self
    }

    /// Declare that this type derives from nothing, whatever its metadata says.
    pub fn no_base(&mut self) -> &mut Self {
        self.base = BaseDeclaration::Explicit(None);
        self
    }

    pub const fn abstract_type(&mut self, is_abstract: bool) -> &mut Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    /// Explicitly add (or re-open) a property for `member`.
    pub fn property(&mut self, member: &str) -> &mut PropertyDeclaration {
        let index = match self.properties.iter().position(|p| p.member == member) {
            Some(index) => index,
            None => {
                self.properties.push(PropertyDeclaration::new(member));
                self.properties.len() - 1
            }
        };

        &mut self.properties[index]
    }

    /// Explicitly add a collection property. Collections of opaque elements
    /// are only mapped this way.
    pub fn collection_property(&mut self, member: &str) -> &mut PropertyDeclaration {
        let property = self.property(member);
        property.expect_collection = true;
        property
    }

    pub fn ignore_property(&mut self, member: &str) -> &mut Self {
        self.ignored_properties.insert(member.to_string());
        self
    }

    pub(crate) fn declared_property(&self, member: &str) -> Option<&PropertyDeclaration> {
        self.properties.iter().find(|p| p.member == member)
    }
}

///
/// PropertyDeclaration
///

#[derive(Clone, Debug)]
pub struct PropertyDeclaration {
    pub(crate) member: String,
    pub(crate) name: Option<String>,
    pub(crate) kind: Option<PropertyKind>,
    pub(crate) nullable: Option<bool>,
    pub(crate) capabilities: QueryCapabilities,
    pub(crate) concurrency: ConcurrencyMode,
    pub(crate) auto_expand: bool,
    pub(crate) expect_collection: bool,
}

impl PropertyDeclaration {
    fn new(member: &str) -> Self {
        Self {
            member: member.to_string(),
            name: None,
            kind: None,
            nullable: None,
            capabilities: QueryCapabilities::default(),
            concurrency: ConcurrencyMode::None,
            auto_expand: false,
            expect_collection: false,
        }
    }

    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Pin the classification. A complex or navigation kind also pins the
    /// kind of the referenced type.
    pub const fn kind(&mut self, kind: PropertyKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    pub const fn nullable(&mut self, nullable: bool) -> &mut Self {
        self.nullable = Some(nullable);
        self
    }

    pub const fn restrict(&mut self, capability: Capability) -> &mut Self {
        self.capabilities.restrict(capability);
        self
    }

    pub const fn concurrency(&mut self, mode: ConcurrencyMode) -> &mut Self {
        self.concurrency = mode;
        self
    }

    pub const fn auto_expand(&mut self, auto_expand: bool) -> &mut Self {
        self.auto_expand = auto_expand;
        self
    }
}
