use convschema_meta::{EnumMember, EnumShape, Primitive, TypeDescriptor, TypeId};
use serde::Serialize;

///
/// EnumTypeConfiguration
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EnumTypeConfiguration {
    pub id: TypeId,
    pub name: String,
    pub namespace: String,
    pub underlying: Primitive,
    pub members: Vec<EnumMember>,
    pub is_flags: bool,
}

impl EnumTypeConfiguration {
    pub(crate) fn from_descriptor(descriptor: &TypeDescriptor, shape: &EnumShape) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
            namespace: descriptor.namespace.clone(),
            underlying: shape.underlying,
            members: shape.members.clone(),
            is_flags: shape.is_flags,
        }
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}
