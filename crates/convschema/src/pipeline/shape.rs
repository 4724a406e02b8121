use convschema_meta::{
    MemberDescriptor, OPAQUE_NAME, OPAQUE_NAMESPACE, Primitive, TypeDescriptor, TypeId,
    TypeMetadataSource, TypeShape, ValueType,
};

///
/// Element
///
/// What a single value (or collection element) resolves to.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Element {
    Primitive(Primitive),
    Enum(TypeId),
    Structural(TypeId),
    Opaque,
}

///
/// ValueShape
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ValueShape {
    Single { element: Element, optional: bool },
    Collection(Element),
    DynamicContainer,
    Unsupported,
}

impl ValueShape {
    /// Structural type referenced by this shape, and whether the reference
    /// crosses a collection boundary.
    pub(crate) const fn structural_target(&self) -> Option<(&TypeId, bool)> {
        match self {
            Self::Single {
                element: Element::Structural(id),
                ..
            } => Some((id, false)),
            Self::Collection(Element::Structural(id)) => Some((id, true)),
            _ => None,
        }
    }

    /// Single primitive or enum values that may take part in a key.
    pub(crate) const fn is_keyable(&self) -> bool {
        match self {
            Self::Single {
                element: Element::Primitive(p),
                ..
            } => p.supports_key(),
            Self::Single {
                element: Element::Enum(_),
                ..
            } => true,
            _ => false,
        }
    }
}

pub(crate) fn opaque_type_id() -> TypeId {
    TypeId::qualified(OPAQUE_NAMESPACE, OPAQUE_NAME)
}

/// Resolve a declared value-type against the metadata source.
pub(crate) fn shape_of(source: &dyn TypeMetadataSource, value_type: &ValueType) -> ValueShape {
    if value_type.is_dynamic_properties() {
        return ValueShape::DynamicContainer;
    }

    match value_type {
        ValueType::Optional(inner) => match shape_of(source, inner) {
            ValueShape::Single { element, .. } => ValueShape::Single {
                element,
                optional: true,
            },
            other => other,
        },
        ValueType::Collection(inner) => match element_of(source, inner.unwrap_optional()) {
            Some(element) => ValueShape::Collection(element),
            None => ValueShape::Unsupported,
        },
        ValueType::Map { .. } => ValueShape::Unsupported,
        single => match element_of(source, single) {
            Some(element) => ValueShape::Single {
                element,
                optional: false,
            },
            None => ValueShape::Unsupported,
        },
    }
}

fn element_of(source: &dyn TypeMetadataSource, value_type: &ValueType) -> Option<Element> {
    match value_type {
        ValueType::Primitive(p) => Some(Element::Primitive(*p)),
        ValueType::Opaque => Some(Element::Opaque),
        ValueType::Named(id) => match &source.descriptor(id)?.shape {
            TypeShape::Structural { .. } => Some(Element::Structural(id.clone())),
            TypeShape::Enum(_) => Some(Element::Enum(id.clone())),
        },
        ValueType::Optional(_) | ValueType::Collection(_) | ValueType::Map { .. } => None,
    }
}

/// `id` followed by every known ancestor descriptor, nearest first.
pub(crate) fn descriptor_chain<'s>(
    source: &'s dyn TypeMetadataSource,
    id: &TypeId,
) -> Vec<&'s TypeDescriptor> {
    std::iter::once(id.clone())
        .chain(source.base_chain(id))
        .filter_map(|ancestor| source.descriptor(&ancestor))
        .collect()
}

/// Member descriptor behind a configured property.
pub(crate) fn member_of<'s>(
    source: &'s dyn TypeMetadataSource,
    declared_on: &TypeId,
    member: &str,
) -> Option<&'s MemberDescriptor> {
    source.descriptor(declared_on)?.member_named(member)
}
