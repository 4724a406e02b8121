use crate::Primitive;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

///
/// TypeId
///
/// Full `Namespace.Name` identity of a described type. The builder only
/// ever holds these, never the descriptors themselves.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self(full_name.into())
    }

    #[must_use]
    pub fn qualified(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{namespace}.{name}"))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unqualified name (the segment after the last `.`).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&TypeId> for TypeId {
    fn from(id: &TypeId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for TypeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

///
/// ValueType
///
/// Declared value-type of a member. `Named` types are resolved against
/// the metadata source; `Opaque` stands for an untyped `object`-like value.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValueType {
    Primitive(Primitive),
    Named(TypeId),
    Optional(Box<ValueType>),
    Collection(Box<ValueType>),
    Map {
        key: Box<ValueType>,
        value: Box<ValueType>,
    },
    Opaque,
}

impl ValueType {
    pub fn named(id: impl Into<TypeId>) -> Self {
        Self::Named(id.into())
    }

    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    #[must_use]
    pub fn collection(element: Self) -> Self {
        Self::Collection(Box::new(element))
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// The shape used for open-type property bags: string keys, opaque values.
    #[must_use]
    pub fn dynamic_properties() -> Self {
        Self::map(Self::Primitive(Primitive::String), Self::Opaque)
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Strip any number of `Optional` wrappers.
    #[must_use]
    pub fn unwrap_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_dynamic_properties(&self) -> bool {
        match self.unwrap_optional() {
            Self::Map { key, value } => {
                matches!(
                    key.unwrap_optional(),
                    Self::Primitive(Primitive::String)
                ) && matches!(value.unwrap_optional(), Self::Opaque)
            }
            _ => false,
        }
    }
}

impl From<Primitive> for ValueType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

///
/// Annotation
///
/// Declarative markers attached to types and members. Several markers
/// are alternate spellings for the same restriction.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum Annotation {
    AutoExpand,
    ConcurrencyCheck,
    DataContract,
    DataMember { name: Option<String> },
    ForeignKey(String),
    IgnoreDataMember,
    Key,
    NonFilterable,
    NotCountable,
    NotExpandable,
    NotFilterable,
    NotMapped,
    NotNavigable,
    NotSortable,
    Required,
    Timestamp,
    Unsortable,
}

///
/// MemberDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub value_type: ValueType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, value_type: impl Into<ValueType>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub fn has(&self, annotation: &Annotation) -> bool {
        self.annotations.contains(annotation)
    }

    /// Target named by a `ForeignKey(..)` annotation, if any.
    #[must_use]
    pub fn foreign_key(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::ForeignKey(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// `DataMember` marker, with its optional rename.
    #[must_use]
    pub fn data_member(&self) -> Option<Option<&str>> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::DataMember { name } => Some(name.as_deref()),
            _ => None,
        })
    }
}

///
/// EnumMember
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

///
/// EnumShape
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumShape {
    pub underlying: Primitive,
    pub members: Vec<EnumMember>,
    pub is_flags: bool,
}

///
/// TypeShape
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TypeShape {
    Structural { is_abstract: bool },
    Enum(EnumShape),
}

///
/// TypeDescriptor
///
/// Read-only description of one type as supplied by a metadata source.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub id: TypeId,
    pub name: String,
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDescriptor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,

    pub shape: TypeShape,
}

impl TypeDescriptor {
    #[must_use]
    pub fn structural(namespace: &str, name: &str) -> Self {
        Self {
            id: TypeId::qualified(namespace, name),
            name: name.to_string(),
            namespace: namespace.to_string(),
            base: None,
            members: Vec::new(),
            annotations: Vec::new(),
            shape: TypeShape::Structural { is_abstract: false },
        }
    }

    /// Enumeration over `Int32` with members numbered in declaration order.
    #[must_use]
    pub fn enumeration(namespace: &str, name: &str, members: &[&str]) -> Self {
        let members = members
            .iter()
            .zip(0_i64..)
            .map(|(name, value)| EnumMember {
                name: (*name).to_string(),
                value,
            })
            .collect();

        Self {
            id: TypeId::qualified(namespace, name),
            name: name.to_string(),
            namespace: namespace.to_string(),
            base: None,
            members: Vec::new(),
            annotations: Vec::new(),
            shape: TypeShape::Enum(EnumShape {
                underlying: Primitive::Int32,
                members,
                is_flags: false,
            }),
        }
    }

    #[must_use]
    pub fn base(mut self, base: impl Into<TypeId>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        if let TypeShape::Structural { is_abstract } = &mut self.shape {
            *is_abstract = true;
        }
        self
    }

    #[must_use]
    pub fn flags(mut self) -> Self {
        if let TypeShape::Enum(shape) = &mut self.shape {
            shape.is_flags = true;
        }
        self
    }

    #[must_use]
    pub fn member(mut self, name: &str, value_type: impl Into<ValueType>) -> Self {
        self.members.push(MemberDescriptor::new(name, value_type));
        self
    }

    #[must_use]
    pub fn annotated_member(
        mut self,
        name: &str,
        value_type: impl Into<ValueType>,
        annotations: &[Annotation],
    ) -> Self {
        let mut member = MemberDescriptor::new(name, value_type);
        member.annotations.extend_from_slice(annotations);
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self.shape, TypeShape::Structural { .. })
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        matches!(self.shape, TypeShape::Structural { is_abstract: true })
    }

    #[must_use]
    pub const fn enum_shape(&self) -> Option<&EnumShape> {
        match &self.shape {
            TypeShape::Enum(shape) => Some(shape),
            TypeShape::Structural { .. } => None,
        }
    }

    #[must_use]
    pub fn has(&self, annotation: &Annotation) -> bool {
        self.annotations.contains(annotation)
    }

    #[must_use]
    pub fn member_named(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}
