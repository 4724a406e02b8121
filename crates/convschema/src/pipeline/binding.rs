//! Navigation binding resolver.
//!
//! For every container, walks each navigation reachable from its entity
//! type (through derived types and single-valued complex properties) and
//! picks the container the navigation's targets live in.

use super::BuildContext;
use crate::{
    error::{BuildError, ConfigurationError},
    lookup::StructuralLookup,
    node::{
        ContainerElement, ContainerKind, NavigationBinding, PropertyConfiguration, PropertyKind,
    },
    registry::ModelRegistry,
};
use convschema_meta::TypeId;
use std::collections::BTreeSet;
use tracing::{debug, trace};

///
/// NavigationPath
///

#[derive(Clone, Debug)]
struct NavigationPath {
    path: String,
    declaring_type: TypeId,
    property: String,
    target: TypeId,
}

/// Bind explicit paths first, then resolve every remaining navigation path.
pub(crate) fn resolve(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let mut bindings = explicit_bindings(ctx)?;

    for container in &ctx.containers {
        for nav in navigation_paths(&ctx.registry, &container.entity_type) {
            if bindings
                .iter()
                .any(|b| b.source == container.name && b.path == nav.path)
            {
                continue;
            }

            let Some(target) = target_container(&ctx.registry, &ctx.containers, &nav.target) else {
                trace!(container = %container.name, path = %nav.path, "navigation left unbound");
                continue;
            };

            trace!(
                container = %container.name,
                path = %nav.path,
                target = %target.name,
                "navigation bound"
            );
            bindings.push(NavigationBinding {
                source: container.name.clone(),
                path: nav.path,
                declaring_type: nav.declaring_type,
                property: nav.property,
                target: target.name.clone(),
                target_kind: target.kind,
                added_explicitly: false,
            });
        }
    }

    debug!(bindings = bindings.len(), "resolved navigation bindings");
    ctx.bindings = bindings;

    Ok(())
}

fn explicit_bindings(ctx: &BuildContext<'_>) -> Result<Vec<NavigationBinding>, BuildError> {
    let mut bindings = Vec::new();

    for decl in &ctx.decls.bindings {
        let source = find_container(&ctx.containers, &decl.container)?;
        let target = find_container(&ctx.containers, &decl.target)?;

        let Some(nav) = navigation_paths(&ctx.registry, &source.entity_type)
            .into_iter()
            .find(|nav| nav.path == decl.path)
        else {
            return Err(ConfigurationError::UnknownProperty {
                ty: source.entity_type.clone(),
                property: decl.path.clone(),
            }
            .into());
        };

        // a later explicit binding for the same path replaces the earlier one
        bindings.retain(|b: &NavigationBinding| !(b.source == source.name && b.path == nav.path));
        bindings.push(NavigationBinding {
            source: source.name.clone(),
            path: nav.path,
            declaring_type: nav.declaring_type,
            property: nav.property,
            target: target.name.clone(),
            target_kind: target.kind,
            added_explicitly: true,
        });
    }

    Ok(bindings)
}

fn find_container<'c>(
    containers: &'c [ContainerElement],
    name: &str,
) -> Result<&'c ContainerElement, BuildError> {
    containers.iter().find(|c| c.name == name).ok_or_else(|| {
        ConfigurationError::UnknownContainer {
            name: name.to_string(),
        }
        .into()
    })
}

//
// paths
//

/// Every navigation reachable from `root`: its own and inherited ones, those
/// declared on derived types (prefixed with the derived type's name), and
/// those inside single-valued complex properties (prefixed with the
/// property path).
fn navigation_paths(registry: &ModelRegistry, root: &TypeId) -> Vec<NavigationPath> {
    let mut out = Vec::new();

    for level in registry.base_chain(root).into_iter().rev() {
        for property in &level.properties {
            collect(registry, &level.id, property, "", &mut out, &mut BTreeSet::new());
        }
    }

    for derived in descendants(registry, root) {
        let Some(node) = registry.get(&derived) else {
            continue;
        };
        let prefix = format!("{derived}/");
        for property in &node.properties {
            collect(registry, &derived, property, &prefix, &mut out, &mut BTreeSet::new());
        }
    }

    out
}

fn collect(
    registry: &ModelRegistry,
    declaring_type: &TypeId,
    property: &PropertyConfiguration,
    prefix: &str,
    out: &mut Vec<NavigationPath>,
    visiting: &mut BTreeSet<TypeId>,
) {
    let Some(target) = &property.target else {
        return;
    };
    let path = format!("{prefix}{}", property.name);

    match property.kind {
        PropertyKind::Navigation | PropertyKind::NavigationCollection => {
            out.push(NavigationPath {
                path,
                declaring_type: declaring_type.clone(),
                property: property.name.clone(),
                target: target.clone(),
            });
        }
        PropertyKind::Complex => {
            if !visiting.insert(target.clone()) {
                return;
            }
            let nested = format!("{path}/");
            for level in registry.base_chain(target).into_iter().rev() {
                for inner in &level.properties {
                    collect(registry, &level.id, inner, &nested, out, visiting);
                }
            }
            visiting.remove(target);
        }
        _ => {}
    }
}

/// All types below `id` in the configured hierarchy, breadth first.
fn descendants(registry: &ModelRegistry, id: &TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut frontier = vec![id.clone()];

    while let Some(current) = frontier.pop() {
        for child in registry.derived_types(&current) {
            if child.id != *id && !out.contains(&child.id) {
                out.push(child.id.clone());
                frontier.push(child.id.clone());
            }
        }
    }

    out.sort_by_key(|d| registry.ancestor_distance(d, id));
    out
}

//
// targets
//

/// Pick the container for navigation targets of type `target`: an exact
/// entity set, then an exact singleton, then the nearest ancestor's set or
/// singleton, then the nearest derived type's set. Earlier registrations
/// win ties.
fn target_container<'c>(
    registry: &ModelRegistry,
    containers: &'c [ContainerElement],
    target: &TypeId,
) -> Option<&'c ContainerElement> {
    let exposing = |ty: &TypeId, kind: ContainerKind| {
        containers
            .iter()
            .find(|c| &c.entity_type == ty && c.kind == kind)
    };

    for level in registry.base_chain(target) {
        let found = exposing(&level.id, ContainerKind::EntitySet)
            .or_else(|| exposing(&level.id, ContainerKind::Singleton));
        if found.is_some() {
            return found;
        }
    }

    containers
        .iter()
        .filter_map(|c| {
            registry
                .ancestor_distance(&c.entity_type, target)
                .filter(|distance| *distance > 0)
                .map(|distance| (distance, c.is_singleton(), c))
        })
        .min_by_key(|(distance, singleton, _)| (*distance, *singleton))
        .map(|(_, _, c)| c)
}
