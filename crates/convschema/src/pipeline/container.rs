use super::BuildContext;
use crate::{
    error::{BuildError, ConfigurationError, ModelError},
    lookup::StructuralLookup,
    node::ContainerElement,
};
use tracing::debug;

/// Turn registered entity sets and singletons into container elements, in
/// registration order. Every exposed type must be a keyed entity type.
pub(crate) fn resolve(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let mut containers = Vec::with_capacity(ctx.decls.containers.len());

    for decl in &ctx.decls.containers {
        let Some(node) = ctx.registry.get(&decl.ty) else {
            return Err(ConfigurationError::UnknownType {
                ty: decl.ty.clone(),
            }
            .into());
        };
        if !node.is_entity() {
            return Err(ConfigurationError::ContainerTypeNotEntity {
                container: decl.name.clone(),
                ty: decl.ty.clone(),
            }
            .into());
        }
        if ctx.registry.resolved_key(&decl.ty).is_none() {
            return Err(ModelError::MissingKey {
                container: decl.name.clone(),
                ty: decl.ty.clone(),
            }
            .into());
        }

        containers.push(ContainerElement {
            name: decl.name.clone(),
            kind: decl.kind,
            entity_type: decl.ty.clone(),
        });
    }

    debug!(containers = containers.len(), "resolved containers");
    ctx.containers = containers;

    Ok(())
}
