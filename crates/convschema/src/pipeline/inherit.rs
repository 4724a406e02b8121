//! Inheritance resolver.
//!
//! Links every type to its nearest modeled ancestor and enforces the rules
//! that span a base chain: one declared key per chain, and no complex type
//! that contains itself.

use super::{BuildContext, shape};
use crate::{
    builder::BaseDeclaration,
    error::{BuildError, ConfigurationError, ModelError},
    lookup::StructuralLookup,
    node::{KeySource, PropertyConfiguration, PropertyKind, StructuralTypeConfiguration},
    registry::ModelRegistry,
};
use convschema_meta::{Annotation, Primitive, TypeId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, trace};

//
// links
//

/// Set the base link of every discovered type. Explicit bases (including an
/// explicit "no base") are kept; anything else links to the nearest source
/// ancestor that is part of the model.
pub(crate) fn resolve_links(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let decls = ctx.decls;
    let mut links = BTreeMap::new();

    for id in ctx.reached.keys() {
        let link = match decls.types.get(id).map(|d| &d.base) {
            Some(BaseDeclaration::Explicit(Some(base))) if !decls.is_ignored(base) => {
                Some(base.clone())
            }
            Some(BaseDeclaration::Explicit(_)) => None,
            Some(BaseDeclaration::Inferred) | None => ctx
                .source
                .base_chain(id)
                .into_iter()
                .find(|ancestor| ctx.reached.contains_key(ancestor)),
        };

        if let Some(base) = &link {
            trace!(ty = %id, base = %base, "linked base type");
        }
        links.insert(id.clone(), link);
    }

    for id in links.keys() {
        let mut seen = BTreeSet::from([id]);
        let mut current = id;

        while let Some(Some(base)) = links.get(current) {
            if !seen.insert(base) {
                return Err(ConfigurationError::InheritanceCycle {
                    ty: id.clone(),
                    base: base.clone(),
                }
                .into());
            }
            current = base;
        }
    }

    debug!(
        linked = links.values().filter(|l| l.is_some()).count(),
        "resolved base type links"
    );
    ctx.links = links;

    Ok(())
}

/// Direct children per type, in id order.
pub(crate) fn children(links: &BTreeMap<TypeId, Option<TypeId>>) -> BTreeMap<TypeId, Vec<TypeId>> {
    let mut children: BTreeMap<TypeId, Vec<TypeId>> = BTreeMap::new();

    for (id, base) in links {
        if let Some(base) = base {
            children.entry(base.clone()).or_default().push(id.clone());
        }
    }

    children
}

/// `root` and everything below it, breadth first.
pub(crate) fn subtree(children: &BTreeMap<TypeId, Vec<TypeId>>, root: &TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(id) = queue.pop_front() {
        if let Some(below) = children.get(&id) {
            queue.extend(below.iter().cloned());
        }
        out.push(id);
    }

    out
}

/// Linked ancestors of `id`, nearest first.
pub(crate) fn linked_ancestors(
    links: &BTreeMap<TypeId, Option<TypeId>>,
    id: &TypeId,
) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut current = links.get(id).cloned().flatten();

    while let Some(base) = current {
        if out.contains(&base) {
            break;
        }
        current = links.get(&base).cloned().flatten();
        out.push(base);
    }

    out
}

/// Nearest type that both `a` and `b` are, or derive from.
pub(crate) fn common_ancestor(
    links: &BTreeMap<TypeId, Option<TypeId>>,
    a: &TypeId,
    b: &TypeId,
) -> TypeId {
    let mut chain_a = vec![a.clone()];
    chain_a.extend(linked_ancestors(links, a));
    let mut chain_b = vec![b.clone()];
    chain_b.extend(linked_ancestors(links, b));

    chain_a
        .iter()
        .find(|id| chain_b.contains(id))
        .or_else(|| chain_a.last())
        .cloned()
        .unwrap_or_else(|| a.clone())
}

//
// keys
//

/// Apply explicit and annotated keys, then reject chains that declare more
/// than one.
pub(crate) fn apply_declared_keys(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let decls = ctx.decls;
    let ids = ctx.registry.ids().cloned().collect::<Vec<_>>();

    for id in &ids {
        let explicit = decls.types.get(id).map(|d| d.keys.as_slice()).unwrap_or_default();

        let (keys, source) = if explicit.is_empty() {
            (annotated_keys(ctx, id)?, KeySource::Annotation)
        } else {
            (explicit_keys(ctx, id, explicit)?, KeySource::Explicit)
        };
        if keys.is_empty() {
            continue;
        }

        for (owner, name) in &keys {
            if let Some(property) = ctx.registry.property_mut(owner, name) {
                property.nullable = false;
            }
        }

        let names = keys.into_iter().map(|(_, name)| name).collect::<Vec<_>>();
        trace!(ty = %id, keys = ?names, %source, "declared key");
        if let Some(node) = ctx.registry.get_mut(id) {
            node.set_key(names, source);
        }
    }

    for id in &ids {
        let chain = ctx.registry.base_chain(id);
        let Some((node, rest)) = chain.split_first() else {
            continue;
        };
        if node.declared_key().is_none() {
            continue;
        }
        if let Some(ancestor) = rest.iter().find(|a| a.declared_key().is_some()) {
            return Err(ModelError::DuplicateKey {
                ty: node.id.clone(),
                ancestor: ancestor.id.clone(),
            }
            .into());
        }
    }

    Ok(())
}

// Explicit keys may name inherited members; each is returned with the level
// that owns the property.
fn explicit_keys(
    ctx: &BuildContext<'_>,
    id: &TypeId,
    members: &[String],
) -> Result<Vec<(TypeId, String)>, BuildError> {
    let Some(node) = ctx.registry.get(id) else {
        return Ok(Vec::new());
    };
    if node.is_complex() {
        return Err(ConfigurationError::KeyOnComplexType {
            ty: id.clone(),
            property: members.first().cloned().unwrap_or_default(),
        }
        .into());
    }

    let mut keys = Vec::new();
    for member in members {
        let Some((owner, property)) = ctx.registry.base_chain(id).into_iter().find_map(|level| {
            level
                .property_by_member(member)
                .map(|property| (level, property))
        }) else {
            return Err(ConfigurationError::UnknownProperty {
                ty: id.clone(),
                property: member.clone(),
            }
            .into());
        };

        if !is_keyable(property.kind, property.primitive) {
            return Err(ConfigurationError::InvalidKeyProperty {
                ty: id.clone(),
                property: member.clone(),
            }
            .into());
        }
        keys.push((owner.id.clone(), property.name.clone()));
    }

    Ok(keys)
}

fn annotated_keys(
    ctx: &BuildContext<'_>,
    id: &TypeId,
) -> Result<Vec<(TypeId, String)>, BuildError> {
    let Some(node) = ctx.registry.get(id).filter(|n| n.is_entity()) else {
        return Ok(Vec::new());
    };

    let mut keys = Vec::new();
    for property in &node.properties {
        let annotated = shape::member_of(ctx.source, &property.declared_on, &property.member)
            .is_some_and(|m| m.has(&Annotation::Key));
        if !annotated {
            continue;
        }
        if !is_keyable(property.kind, property.primitive) {
            return Err(ConfigurationError::InvalidKeyProperty {
                ty: id.clone(),
                property: property.member.clone(),
            }
            .into());
        }
        keys.push((id.clone(), property.name.clone()));
    }

    Ok(keys)
}

fn is_keyable(kind: PropertyKind, primitive: Option<Primitive>) -> bool {
    kind.is_keyable() && primitive.is_none_or(Primitive::supports_key)
}

//
// recursive complex types
//

/// Reject complex types that reach themselves through single-valued
/// complex properties. Collection edges break the loop.
pub(crate) fn reject_recursive_complex_types(ctx: &BuildContext<'_>) -> Result<(), BuildError> {
    for node in ctx.registry.iter().filter(|n| n.is_complex()) {
        let mut seen = BTreeSet::new();
        let mut stack = vec![node.id.clone()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for property in complex_edges(ctx, &current) {
                let Some(target) = &property.target else {
                    continue;
                };
                if target == &node.id {
                    return Err(ConfigurationError::RecursiveComplexType {
                        ty: node.id.clone(),
                        declaring_type: current,
                        property: property.name.clone(),
                    }
                    .into());
                }
                stack.push(target.clone());
            }
        }
    }

    Ok(())
}

fn complex_edges<'r>(
    ctx: &'r BuildContext<'_>,
    id: &TypeId,
) -> Vec<&'r PropertyConfiguration> {
    ctx.registry
        .all_properties(id)
        .into_iter()
        .filter(|p| p.kind == PropertyKind::Complex)
        .collect()
}

/// Keyed ancestor of `id`, if any level above it declares a key.
pub(crate) fn keyed_ancestor<'r>(
    registry: &'r ModelRegistry,
    id: &TypeId,
) -> Option<&'r StructuralTypeConfiguration> {
    registry
        .base_chain(id)
        .into_iter()
        .skip(1)
        .find(|level| level.declared_key().is_some())
}
