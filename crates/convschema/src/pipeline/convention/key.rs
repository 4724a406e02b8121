use crate::{
    lookup::StructuralLookup,
    node::KeySource,
    pipeline::{BuildContext, inherit},
};
use convschema_meta::TypeId;
use tracing::{debug, trace};

/// How well `member` matches the key naming convention for a type named
/// `type_name`. Lower is better; `None` means no match.
pub(crate) fn key_convention_rank(type_name: &str, member: &str) -> Option<u8> {
    if member == "Id" {
        Some(0)
    } else if member.eq_ignore_ascii_case("id") {
        Some(1)
    } else if member.len() == type_name.len() + 2
        && member
            .get(..type_name.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(type_name))
        && member[type_name.len()..].eq_ignore_ascii_case("id")
    {
        Some(2)
    } else {
        None
    }
}

/// Give every keyless entity hierarchy a conventional key, base types first.
pub(crate) fn apply_key_convention(ctx: &mut BuildContext<'_>) {
    let mut ids = ctx
        .registry
        .iter()
        .filter(|node| node.is_entity())
        .map(|node| (ctx.registry.base_chain(&node.id).len(), node.id.clone()))
        .collect::<Vec<_>>();
    ids.sort();

    let mut keyed = 0usize;
    for (_, id) in ids {
        if let Some(name) = conventional_key(ctx, &id) {
            trace!(ty = %id, key = %name, "key by convention");
            if let Some(node) = ctx.registry.get_mut(&id) {
                if let Some(property) = node.property_mut(&name) {
                    property.nullable = false;
                }
                node.set_key(vec![name], KeySource::Convention);
            }
            keyed += 1;
        }
    }

    debug!(types = keyed, "applied key convention");
}

fn conventional_key(ctx: &BuildContext<'_>, id: &TypeId) -> Option<String> {
    let node = ctx.registry.get(id)?;
    if node.declared_key().is_some()
        || inherit::keyed_ancestor(&ctx.registry, id).is_some()
        || has_keyed_descendant(ctx, id)
    {
        return None;
    }

    node.properties
        .iter()
        .filter(|p| p.kind.is_keyable() && p.primitive.is_none_or(|p| p.supports_key()))
        .filter_map(|p| key_convention_rank(&node.name, &p.member).map(|rank| (rank, p)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, p)| p.name.clone())
}

// A key declared lower in the hierarchy leaves the levels above it keyless.
fn has_keyed_descendant(ctx: &BuildContext<'_>, id: &TypeId) -> bool {
    let mut frontier = vec![id.clone()];
    let mut seen = Vec::new();

    while let Some(current) = frontier.pop() {
        for child in ctx.registry.derived_types(&current) {
            if seen.contains(&child.id) {
                continue;
            }
            if child.declared_key().is_some() {
                return true;
            }
            seen.push(child.id.clone());
            frontier.push(child.id.clone());
        }
    }

    false
}
