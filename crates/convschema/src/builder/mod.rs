//! Caller configuration surface.
//!
//! Registration only records intent. Nothing is validated until `build`,
//! so a builder can be filled in any order and built repeatedly.

mod declaration;

pub use declaration::{BaseDeclaration, PropertyDeclaration, TypeDeclaration};

use crate::{
    config::BuilderConfig, error::BuildError, graph::SchemaGraph, node::ContainerKind,
    node::StructuralKind, pipeline, registry::ModelRegistry,
};
use convschema_meta::{TypeId, TypeMetadataSource};
use std::collections::{BTreeMap, BTreeSet};

type ModelHook<'a> = Box<dyn Fn(&mut ModelRegistry) + 'a>;

///
/// KindConflict
///
/// A type registered once as entity and once as complex.
///

#[derive(Clone, Debug)]
pub(crate) struct KindConflict {
    pub ty: TypeId,
    pub prior: StructuralKind,
    pub requested: StructuralKind,
}

///
/// ContainerDeclaration
///

#[derive(Clone, Debug)]
pub(crate) struct ContainerDeclaration {
    pub name: String,
    pub kind: ContainerKind,
    pub ty: TypeId,
}

///
/// BindingDeclaration
///

#[derive(Clone, Debug)]
pub(crate) struct BindingDeclaration {
    pub container: String,
    pub path: String,
    pub target: String,
}

///
/// Declarations
///
/// Everything the caller registered, as read by the pipeline.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct Declarations {
    pub types: BTreeMap<TypeId, TypeDeclaration>,
    pub conflicts: Vec<KindConflict>,
    pub containers: Vec<ContainerDeclaration>,
    pub bindings: Vec<BindingDeclaration>,
    pub ignored: BTreeSet<TypeId>,
}

impl Declarations {
    pub fn is_ignored(&self, id: &TypeId) -> bool {
        self.ignored.contains(id)
    }

    fn declare(&mut self, id: TypeId, kind: StructuralKind) -> &mut TypeDeclaration {
        let decl = self
            .types
            .entry(id.clone())
            .or_insert_with(|| TypeDeclaration::new(id.clone(), kind));

        if decl.kind != kind {
            self.conflicts.push(KindConflict {
                ty: id,
                prior: decl.kind,
                requested: kind,
            });
        }

        decl
    }
}

///
/// SchemaBuilder
///
/// Infers a schema graph from registered types, their metadata, and
/// naming/annotation conventions.
///

pub struct SchemaBuilder<'a> {
    source: &'a dyn TypeMetadataSource,
    config: BuilderConfig,
    decls: Declarations,
    hooks: Vec<ModelHook<'a>>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(source: &'a dyn TypeMetadataSource) -> Self {
        Self::with_config(source, BuilderConfig::default())
    }

    pub fn with_config(source: &'a dyn TypeMetadataSource, config: BuilderConfig) -> Self {
        Self {
            source,
            config,
            decls: Declarations::default(),
            hooks: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub const fn config_mut(&mut self) -> &mut BuilderConfig {
        &mut self.config
    }

    /// Register `id` as an entity type.
    pub fn entity_type(&mut self, id: impl Into<TypeId>) -> &mut TypeDeclaration {
        self.decls.declare(id.into(), StructuralKind::Entity)
    }

    /// Register `id` as a complex type.
    pub fn complex_type(&mut self, id: impl Into<TypeId>) -> &mut TypeDeclaration {
        self.decls.declare(id.into(), StructuralKind::Complex)
    }

    /// Expose an entity set; its element type is registered as an entity type.
    pub fn entity_set(&mut self, name: &str, id: impl Into<TypeId>) -> &mut TypeDeclaration {
        self.container(name, ContainerKind::EntitySet, id.into())
    }

    /// Expose a singleton; its type is registered as an entity type.
    pub fn singleton(&mut self, name: &str, id: impl Into<TypeId>) -> &mut TypeDeclaration {
        self.container(name, ContainerKind::Singleton, id.into())
    }

    /// Bind the navigation at `path` from `container` to `target`,
    /// bypassing binding resolution for that path.
    pub fn bind(&mut self, container: &str, path: &str, target: &str) -> &mut Self {
        self.decls.bindings.push(BindingDeclaration {
            container: container.to_string(),
            path: path.to_string(),
            target: target.to_string(),
        });
        self
    }

    /// Exclude `id` from the model. Derived types reachable only through it
    /// are dropped with it.
    pub fn ignore(&mut self, id: impl Into<TypeId>) -> &mut Self {
        self.decls.ignored.insert(id.into());
        self
    }

    /// Register a hook that runs after conventions and before bindings are
    /// resolved. Changes it makes are final and are not re-validated.
    pub fn on_model_creating(&mut self, hook: impl Fn(&mut ModelRegistry) + 'a) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    #[must_use]
    pub fn declaration(&self, id: &TypeId) -> Option<&TypeDeclaration> {
        self.decls.types.get(id)
    }

    /// Run the full pipeline against the current registrations.
    pub fn build(&self) -> Result<SchemaGraph, BuildError> {
        pipeline::run(self.source, &self.config, &self.decls, &self.hooks)
    }

    fn container(&mut self, name: &str, kind: ContainerKind, id: TypeId) -> &mut TypeDeclaration {
        self.decls.containers.push(ContainerDeclaration {
            name: name.to_string(),
            kind,
            ty: id.clone(),
        });

        self.decls.declare(id, StructuralKind::Entity)
    }
}
