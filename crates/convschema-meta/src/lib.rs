//! Type metadata boundary for `convschema`.
//!
//! Describes application types (names, members, annotations, base types)
//! in a form the schema builder can classify without any host-runtime
//! reflection. Callers implement [`TypeMetadataSource`] or fill a
//! [`TypeCatalog`].

mod descriptor;
mod primitive;
mod source;

pub use descriptor::{
    Annotation, EnumMember, EnumShape, MemberDescriptor, TypeDescriptor, TypeId, TypeShape,
    ValueType,
};
pub use primitive::Primitive;
pub use source::{TypeCatalog, TypeMetadataSource};

/// Namespace of the synthetic complex type used for opaque collection elements.
pub const OPAQUE_NAMESPACE: &str = "System";

/// Name of the synthetic complex type used for opaque collection elements.
pub const OPAQUE_NAME: &str = "Object";
