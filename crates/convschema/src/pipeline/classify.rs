//! Classification engine.
//!
//! Walks every type reachable from the caller's registrations, decides
//! whether each one is an entity or a complex type, and creates the
//! per-type configurations with their classified properties.

use super::{
    BuildContext, KindClaim, Reach,
    convention::{self, key_convention_rank},
    inherit,
    shape::{self, Element, ValueShape, opaque_type_id},
};
use crate::{
    builder::{BaseDeclaration, PropertyDeclaration},
    error::{BuildError, ConfigurationError, ModelError},
    node::{
        EnumTypeConfiguration, Multiplicity, Navigation, PropertyConfiguration, PropertyKind,
        StructuralKind, StructuralTypeConfiguration,
    },
};
use convschema_meta::{
    Annotation, MemberDescriptor, OPAQUE_NAME, OPAQUE_NAMESPACE, TypeDescriptor, TypeId,
    TypeShape,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, trace};

//
// discovery
//

/// Collect every structural type reachable from explicit registrations
/// through member references, explicit base types and derived types.
pub(crate) fn discover(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    if let Some(conflict) = ctx.decls.conflicts.first() {
        return Err(ConfigurationError::KindConflict {
            ty: conflict.ty.clone(),
            prior: conflict.prior,
            requested: conflict.requested,
        }
        .into());
    }

    check_containers(ctx)?;

    let decls = ctx.decls;
    let mut queue = VecDeque::new();
    for (id, decl) in &decls.types {
        if decls.is_ignored(id) {
            continue;
        }
        structural_descriptor(ctx, id)?;
        enter(ctx, id, &mut queue).by_declaration = true;

        if let BaseDeclaration::Explicit(Some(base)) = &decl.base {
            structural_descriptor(ctx, base)?;
            if !decls.is_ignored(base) {
                enter(ctx, base, &mut queue);
            }
        }
    }

    loop {
        while let Some(id) = queue.pop_front() {
            walk_members(ctx, &id, &mut queue);
        }

        if !ctx.config.discover_derived_types {
            break;
        }

        let pulled = derived_closure(ctx);
        if pulled.is_empty() {
            break;
        }
        for id in pulled {
            trace!(ty = %id, "pulled in derived type");
            enter(ctx, &id, &mut queue);
        }
    }

    debug!(types = ctx.reached.len(), "discovered structural types");

    Ok(())
}

fn check_containers(ctx: &BuildContext<'_>) -> Result<(), BuildError> {
    let mut names = BTreeSet::new();

    for container in &ctx.decls.containers {
        if !names.insert(container.name.as_str()) {
            return Err(ConfigurationError::DuplicateContainer {
                name: container.name.clone(),
            }
            .into());
        }
        if ctx.decls.is_ignored(&container.ty) {
            return Err(ConfigurationError::IgnoredTypeExposed {
                container: container.name.clone(),
                ty: container.ty.clone(),
            }
            .into());
        }
    }

    Ok(())
}

fn structural_descriptor<'s>(
    ctx: &BuildContext<'s>,
    id: &TypeId,
) -> Result<&'s TypeDescriptor, BuildError> {
    let Some(descriptor) = ctx.source.descriptor(id) else {
        return Err(ConfigurationError::UnknownType { ty: id.clone() }.into());
    };
    if !descriptor.is_structural() {
        return Err(ConfigurationError::NotStructural { ty: id.clone() }.into());
    }

    Ok(descriptor)
}

fn enter<'c>(
    ctx: &'c mut BuildContext<'_>,
    id: &TypeId,
    queue: &mut VecDeque<TypeId>,
) -> &'c mut Reach {
    if !ctx.reached.contains_key(id) {
        queue.push_back(id.clone());
    }

    ctx.reached.entry(id.clone()).or_default()
}

// Follow member references of `id` and every ancestor descriptor. Members of
// ancestors already in the model are walked twice, which is harmless.
fn walk_members(ctx: &mut BuildContext<'_>, id: &TypeId, queue: &mut VecDeque<TypeId>) {
    let decls = ctx.decls;
    let decl = decls.types.get(id);

    for descriptor in shape::descriptor_chain(ctx.source, id) {
        for member in &descriptor.members {
            if decl.is_some_and(|d| d.ignored_properties.contains(&member.name)) {
                continue;
            }
            let explicit = decl.and_then(|d| d.declared_property(&member.name));
            if explicit.is_none() && !convention::is_mapped(descriptor, member) {
                continue;
            }

            let value = shape::shape_of(ctx.source, &member.value_type);
            let Some((target, through_collection)) = value.structural_target() else {
                continue;
            };
            if decls.is_ignored(target) {
                continue;
            }

            if let Some(kind) = explicit.and_then(|p| p.kind).and_then(claimed_kind) {
                ctx.claims.push(KindClaim {
                    ty: target.clone(),
                    kind,
                });
            }

            let reach = enter(ctx, target, queue);
            if through_collection {
                reach.by_collection = true;
            } else {
                reach.by_value = true;
            }
        }
    }
}

const fn claimed_kind(kind: PropertyKind) -> Option<StructuralKind> {
    match kind {
        PropertyKind::Complex | PropertyKind::ComplexCollection => Some(StructuralKind::Complex),
        PropertyKind::Navigation | PropertyKind::NavigationCollection => {
            Some(StructuralKind::Entity)
        }
        _ => None,
    }
}

// Types of the metadata source that derive, without passing through an
// ignored type, from something already in the model.
fn derived_closure(ctx: &BuildContext<'_>) -> Vec<TypeId> {
    let mut pulled = Vec::new();

    for descriptor in ctx.source.types() {
        if !descriptor.is_structural()
            || ctx.reached.contains_key(&descriptor.id)
            || ctx.decls.is_ignored(&descriptor.id)
        {
            continue;
        }

        for ancestor in ctx.source.base_chain(&descriptor.id) {
            if ctx.decls.is_ignored(&ancestor) {
                break;
            }
            if ctx.reached.contains_key(&ancestor) {
                pulled.push(descriptor.id.clone());
                break;
            }
        }
    }

    pulled
}

//
// kind assignment
//

/// Give every hierarchy a single kind. Explicit registrations and
/// explicitly classified properties pin kinds; everything else is inferred.
pub(crate) fn assign_kinds(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let children = inherit::children(&ctx.links);
    let roots = ctx
        .links
        .iter()
        .filter(|(_, base)| base.is_none())
        .map(|(id, _)| id.clone())
        .collect::<Vec<_>>();

    for root in roots {
        let members = inherit::subtree(&children, &root);
        let pinned = pinned_kinds(ctx, &members)?;
        let kind = hierarchy_kind(ctx, &members, &pinned)?;

        trace!(root = %root, %kind, size = members.len(), "classified hierarchy");
        for id in members {
            ctx.kinds.insert(id, kind);
        }
    }

    Ok(())
}

fn pinned_kinds(
    ctx: &BuildContext<'_>,
    members: &[TypeId],
) -> Result<BTreeMap<TypeId, StructuralKind>, BuildError> {
    let mut pinned = BTreeMap::new();

    for id in members {
        if let Some(decl) = ctx.decls.types.get(id) {
            pinned.insert(id.clone(), decl.kind);
        }
    }

    for claim in ctx.claims.iter().filter(|c| members.contains(&c.ty)) {
        match pinned.get(&claim.ty) {
            Some(prior) if *prior != claim.kind => {
                return Err(ConfigurationError::KindConflict {
                    ty: claim.ty.clone(),
                    prior: *prior,
                    requested: claim.kind,
                }
                .into());
            }
            Some(_) => {}
            None => {
                pinned.insert(claim.ty.clone(), claim.kind);
            }
        }
    }

    // a pinned type must agree with every pinned ancestor
    for (id, kind) in &pinned {
        for ancestor in inherit::linked_ancestors(&ctx.links, id) {
            if let Some(prior) = pinned.get(&ancestor)
                && prior != kind
            {
                return Err(ConfigurationError::KindConflict {
                    ty: id.clone(),
                    prior: *prior,
                    requested: *kind,
                }
                .into());
            }
        }
    }

    Ok(pinned)
}

fn hierarchy_kind(
    ctx: &BuildContext<'_>,
    members: &[TypeId],
    pinned: &BTreeMap<TypeId, StructuralKind>,
) -> Result<StructuralKind, BuildError> {
    let entity = pinned
        .iter()
        .find(|(_, kind)| **kind == StructuralKind::Entity)
        .map(|(id, _)| id);
    let complex = pinned
        .iter()
        .find(|(_, kind)| **kind == StructuralKind::Complex)
        .map(|(id, _)| id);

    match (entity, complex) {
        (Some(entity), Some(complex)) => Err(ModelError::AmbiguousBaseKind {
            base: inherit::common_ancestor(&ctx.links, entity, complex),
            entity: entity.clone(),
            complex: complex.clone(),
        }
        .into()),
        (Some(_), None) => Ok(StructuralKind::Entity),
        (None, Some(_)) => Ok(StructuralKind::Complex),
        (None, None) => Ok(infer_kind(ctx, members)),
    }
}

// Nothing pinned: a hierarchy with a discoverable key is an entity
// hierarchy unless it is only ever used as collection elements.
fn infer_kind(ctx: &BuildContext<'_>, members: &[TypeId]) -> StructuralKind {
    let has_key = members.iter().any(|id| has_discoverable_key(ctx, id));

    let reaches = members
        .iter()
        .filter_map(|id| ctx.reached.get(id))
        .collect::<Vec<_>>();
    let collection_only = reaches.iter().any(|r| r.by_collection)
        && reaches.iter().all(|r| !r.by_value && !r.by_declaration);

    if has_key && !collection_only {
        StructuralKind::Entity
    } else {
        StructuralKind::Complex
    }
}

fn has_discoverable_key(ctx: &BuildContext<'_>, id: &TypeId) -> bool {
    let Some(descriptor) = ctx.source.descriptor(id) else {
        return false;
    };

    shape::descriptor_chain(ctx.source, id)
        .into_iter()
        .flat_map(|level| {
            level
                .members
                .iter()
                .filter(move |m| convention::is_mapped(level, m))
        })
        .any(|member| {
            shape::shape_of(ctx.source, &member.value_type).is_keyable()
                && (member.has(&Annotation::Key)
                    || key_convention_rank(&descriptor.name, &member.name).is_some())
        })
}

//
// materialization
//

/// Create one configuration per classified type, with its own properties.
pub(crate) fn materialize(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let decls = ctx.decls;
    let kinds = ctx.kinds.clone();
    let mut uses_opaque = false;

    for (id, kind) in kinds {
        let descriptor = structural_descriptor(ctx, &id)?;
        let decl = decls.types.get(&id);

        let mut node = StructuralTypeConfiguration::new(
            id.clone(),
            descriptor.name.clone(),
            descriptor.namespace.clone(),
            kind,
        );
        node.base = ctx.links.get(&id).cloned().flatten();
        node.is_abstract = decl
            .and_then(|d| d.is_abstract)
            .unwrap_or_else(|| descriptor.is_abstract());
        node.added_explicitly = decl.is_some();

        let members = own_members(ctx, &id);
        for (level, member) in &members {
            if decl.is_some_and(|d| d.ignored_properties.contains(&member.name)) {
                continue;
            }
            let explicit = decl.and_then(|d| d.declared_property(&member.name));
            if explicit.is_none() && !convention::is_mapped(level, member) {
                continue;
            }

            if let Some(property) = build_property(ctx, &id, level, member, explicit)? {
                uses_opaque |= property.target.as_ref() == Some(&opaque_type_id());
                node.properties.push(property);
            }
        }

        // overrides must name a member this level owns
        if let Some(decl) = decl {
            for property in &decl.properties {
                if !members.iter().any(|(_, m)| m.name == property.member) {
                    return Err(ConfigurationError::UnknownProperty {
                        ty: id.clone(),
                        property: property.member.clone(),
                    }
                    .into());
                }
            }
        }

        ctx.registry.insert(node);
    }

    if uses_opaque {
        ctx.registry.insert(StructuralTypeConfiguration::new(
            opaque_type_id(),
            OPAQUE_NAME.to_string(),
            OPAQUE_NAMESPACE.to_string(),
            StructuralKind::Complex,
        ));
    }

    debug!(
        types = ctx.registry.len(),
        enums = ctx.registry.enums().count(),
        "materialized structural types"
    );

    Ok(())
}

/// Members this level owns: its own plus those of unmapped ancestors up to
/// the linked base, minus anything the linked base chain already declares.
/// Base-most members come first; a redeclared member keeps its position.
fn own_members<'s>(
    ctx: &BuildContext<'s>,
    id: &TypeId,
) -> Vec<(&'s TypeDescriptor, &'s MemberDescriptor)> {
    let flatten_all = ctx
        .decls
        .types
        .get(id)
        .is_some_and(|d| d.base == BaseDeclaration::Explicit(None));

    let mut levels = Vec::new();
    for (depth, level) in shape::descriptor_chain(ctx.source, id)
        .into_iter()
        .enumerate()
    {
        if depth > 0 && !flatten_all && ctx.kinds.contains_key(&level.id) {
            break;
        }
        levels.push(level);
    }

    let inherited = ctx
        .links
        .get(id)
        .cloned()
        .flatten()
        .map(|base| {
            shape::descriptor_chain(ctx.source, &base)
                .into_iter()
                .flat_map(|level| level.members.iter().map(|m| m.name.as_str()))
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    let mut out: Vec<(&TypeDescriptor, &MemberDescriptor)> = Vec::new();
    for level in levels.into_iter().rev() {
        for member in &level.members {
            if inherited.contains(member.name.as_str()) {
                continue;
            }
            match out.iter().position(|(_, m)| m.name == member.name) {
                Some(index) => out[index] = (level, member),
                None => out.push((level, member)),
            }
        }
    }

    out
}

fn build_property(
    ctx: &mut BuildContext<'_>,
    owner: &TypeId,
    level: &TypeDescriptor,
    member: &MemberDescriptor,
    explicit: Option<&PropertyDeclaration>,
) -> Result<Option<PropertyConfiguration>, BuildError> {
    let value = shape::shape_of(ctx.source, &member.value_type);
    let allow_opaque = explicit.is_some();

    let classified = match &value {
        ValueShape::Single { element, optional } => {
            classify_element(ctx, element, false, allow_opaque).map(|c| (c, *optional))
        }
        ValueShape::Collection(element) => {
            classify_element(ctx, element, true, allow_opaque).map(|c| (c, false))
        }
        ValueShape::DynamicContainer => Some((
            Classified {
                kind: PropertyKind::DynamicPropertyContainer,
                target: None,
                primitive: None,
            },
            false,
        )),
        ValueShape::Unsupported => None,
    };

    let Some((classified, optional)) = classified else {
        if explicit.is_some() {
            return Err(ConfigurationError::UnsupportedProperty {
                ty: owner.clone(),
                property: member.name.clone(),
            }
            .into());
        }
        trace!(ty = %owner, member = %member.name, "member not mapped");
        return Ok(None);
    };

    if let Some(explicit) = explicit {
        let kind_mismatch = explicit.kind.is_some_and(|k| k != classified.kind);
        if kind_mismatch || (explicit.expect_collection && !classified.kind.is_collection()) {
            let kind = explicit
                .kind
                .map_or_else(|| "a collection".to_string(), |k| k.to_string());
            return Err(ConfigurationError::InvalidPropertyKind {
                ty: owner.clone(),
                property: member.name.clone(),
                kind,
            }
            .into());
        }
    }

    if let Some(target) = &classified.target {
        register_enum(ctx, target);
    }

    let nullable = explicit.and_then(|p| p.nullable).unwrap_or(optional);
    let navigation = classified.kind.is_navigation().then(|| Navigation {
        multiplicity: if classified.kind.is_collection() {
            Multiplicity::Many
        } else if nullable {
            Multiplicity::ZeroOrOne
        } else {
            Multiplicity::One
        },
        foreign_keys: Vec::new(),
        principal_keys: Vec::new(),
        auto_expand: explicit.is_some_and(|p| p.auto_expand),
    });

    Ok(Some(PropertyConfiguration {
        name: explicit
            .and_then(|p| p.name.clone())
            .unwrap_or_else(|| ctx.config.property_case.apply(&member.name)),
        member: member.name.clone(),
        declared_on: level.id.clone(),
        value_type: member.value_type.clone(),
        kind: classified.kind,
        target: classified.target,
        primitive: classified.primitive,
        nullable,
        added_explicitly: explicit.is_some(),
        concurrency: explicit.map(|p| p.concurrency).unwrap_or_default(),
        capabilities: explicit.map(|p| p.capabilities).unwrap_or_default(),
        navigation,
    }))
}

struct Classified {
    kind: PropertyKind,
    target: Option<TypeId>,
    primitive: Option<convschema_meta::Primitive>,
}

fn classify_element(
    ctx: &BuildContext<'_>,
    element: &Element,
    collection: bool,
    allow_opaque: bool,
) -> Option<Classified> {
    let (kind, target, primitive) = match element {
        Element::Primitive(p) => (PropertyKind::Primitive, None, Some(*p)),
        Element::Enum(id) => (PropertyKind::Enum, Some(id.clone()), None),
        Element::Structural(id) => match ctx.kinds.get(id)? {
            StructuralKind::Entity => (PropertyKind::Navigation, Some(id.clone()), None),
            StructuralKind::Complex => (PropertyKind::Complex, Some(id.clone()), None),
        },
        Element::Opaque if allow_opaque => (PropertyKind::Complex, Some(opaque_type_id()), None),
        Element::Opaque => return None,
    };

    let kind = match (kind, collection) {
        (PropertyKind::Primitive | PropertyKind::Enum, true) => PropertyKind::PrimitiveCollection,
        (PropertyKind::Complex, true) => PropertyKind::ComplexCollection,
        (PropertyKind::Navigation, true) => PropertyKind::NavigationCollection,
        (kind, _) => kind,
    };

    Some(Classified {
        kind,
        target,
        primitive,
    })
}

fn register_enum(ctx: &mut BuildContext<'_>, id: &TypeId) {
    if ctx.registry.enum_type(id).is_some() {
        return;
    }
    if let Some(descriptor) = ctx.source.descriptor(id)
        && let TypeShape::Enum(shape) = &descriptor.shape
    {
        ctx.registry
            .insert_enum(EnumTypeConfiguration::from_descriptor(descriptor, shape));
    }
}
