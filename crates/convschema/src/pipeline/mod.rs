//! Build pipeline.
//!
//! Every phase reads and writes one `BuildContext`; nothing outlives a
//! single `run`, so independent builds never observe each other.

mod binding;
mod classify;
mod container;
mod convention;
mod inherit;
mod prune;
mod shape;

use crate::{
    builder::Declarations,
    config::BuilderConfig,
    error::BuildError,
    graph::SchemaGraph,
    node::{ContainerElement, NavigationBinding, StructuralKind},
    registry::ModelRegistry,
};
use convschema_meta::{TypeId, TypeMetadataSource};
use std::collections::BTreeMap;
use tracing::debug;

///
/// Reach
///
/// How discovery reached a type.
///

#[expect(clippy::struct_field_names)]
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Reach {
    pub by_declaration: bool,
    pub by_value: bool,
    pub by_collection: bool,
}

///
/// KindClaim
///
/// Kind pinned on a referenced type by an explicitly classified property.
///

#[derive(Clone, Debug)]
pub(crate) struct KindClaim {
    pub ty: TypeId,
    pub kind: StructuralKind,
}

///
/// BuildContext
///

pub(crate) struct BuildContext<'a> {
    pub source: &'a dyn TypeMetadataSource,
    pub config: &'a BuilderConfig,
    pub decls: &'a Declarations,
    pub reached: BTreeMap<TypeId, Reach>,
    pub claims: Vec<KindClaim>,
    pub links: BTreeMap<TypeId, Option<TypeId>>,
    pub kinds: BTreeMap<TypeId, StructuralKind>,
    pub registry: ModelRegistry,
    pub containers: Vec<ContainerElement>,
    pub bindings: Vec<NavigationBinding>,
}

impl<'a> BuildContext<'a> {
    fn new(
        source: &'a dyn TypeMetadataSource,
        config: &'a BuilderConfig,
        decls: &'a Declarations,
    ) -> Self {
        Self {
            source,
            config,
            decls,
            reached: BTreeMap::new(),
            claims: Vec::new(),
            links: BTreeMap::new(),
            kinds: BTreeMap::new(),
            registry: ModelRegistry::default(),
            containers: Vec::new(),
            bindings: Vec::new(),
        }
    }

    fn finish(self) -> SchemaGraph {
        let (types, enums) = self.registry.into_parts();

        SchemaGraph::new(
            self.config.namespace.clone(),
            self.config.container_name.clone(),
            types,
            enums,
            self.containers,
            self.bindings,
        )
    }
}

/// Run every phase in order. Any failure aborts the whole build.
pub(crate) fn run(
    source: &dyn TypeMetadataSource,
    config: &BuilderConfig,
    decls: &Declarations,
    hooks: &[Box<dyn Fn(&mut ModelRegistry) + '_>],
) -> Result<SchemaGraph, BuildError> {
    let mut ctx = BuildContext::new(source, config, decls);

    // Phase 1: reach, link and classify every type, then create configurations.
    classify::discover(&mut ctx)?;
    inherit::resolve_links(&mut ctx)?;
    classify::assign_kinds(&mut ctx)?;
    classify::materialize(&mut ctx)?;

    // Phase 2: per-property conventions and the inheritance rules built on them.
    convention::apply_property_conventions(&mut ctx);
    inherit::apply_declared_keys(&mut ctx)?;
    inherit::reject_recursive_complex_types(&ctx)?;

    // Phase 3: type-level conventions.
    convention::apply_key_convention(&mut ctx);
    convention::resolve_dynamic_containers(&mut ctx)?;
    convention::discover_foreign_keys(&mut ctx)?;
    container::resolve(&mut ctx)?;

    // Phase 4: caller adjustments are taken as-is.
    for hook in hooks {
        hook(&mut ctx.registry);
    }

    // Phase 5: bind navigations, then drop what no container can reach.
    binding::resolve(&mut ctx)?;
    prune::run(&mut ctx);

    debug!(
        types = ctx.registry.len(),
        containers = ctx.containers.len(),
        bindings = ctx.bindings.len(),
        "schema build complete"
    );

    Ok(ctx.finish())
}
