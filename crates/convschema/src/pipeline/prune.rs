use super::BuildContext;
use crate::{lookup::StructuralLookup, node::PropertyKind};
use convschema_meta::TypeId;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, trace};

/// Drop every structural and enum type that no container can reach through
/// base types, derived types or property targets.
pub(crate) fn run(ctx: &mut BuildContext<'_>) {
    if !ctx.config.prune_unreachable || ctx.containers.is_empty() {
        return;
    }

    let mut reachable = BTreeSet::new();
    let mut enums = BTreeSet::new();
    let mut queue = ctx
        .containers
        .iter()
        .map(|c| c.entity_type.clone())
        .collect::<VecDeque<_>>();

    while let Some(id) = queue.pop_front() {
        if !reachable.insert(id.clone()) {
            continue;
        }
        let Some(node) = ctx.registry.get(&id) else {
            continue;
        };

        if let Some(base) = &node.base {
            queue.push_back(base.clone());
        }
        queue.extend(ctx.registry.derived_types(&id).map(|d| d.id.clone()));

        for property in &node.properties {
            let Some(target) = &property.target else {
                continue;
            };
            match property.kind {
                PropertyKind::Enum | PropertyKind::PrimitiveCollection => {
                    enums.insert(target.clone());
                }
                _ => queue.push_back(target.clone()),
            }
        }
    }

    let before = ctx.registry.len();
    ctx.registry.retain(|id| {
        let keep = reachable.contains(id);
        if !keep {
            trace!(ty = %id, "pruned unreachable type");
        }
        keep
    });
    ctx.registry.retain_enums(|id: &TypeId| enums.contains(id));

    debug!(
        removed = before - ctx.registry.len(),
        kept = ctx.registry.len(),
        "pruned unreachable types"
    );
}
