//! Convention-based schema builder.
//!
//! Register a few root types and the containers that expose them; the
//! builder discovers everything reachable, classifies each type as an
//! entity or complex type, applies naming and annotation conventions, binds
//! navigations to containers, and prunes what no container can reach.
//!
//! ```ignore
//! let mut builder = SchemaBuilder::new(&catalog);
//! builder.entity_set("Products", "Shop.Product");
//! let graph = builder.build()?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod lookup;
pub mod node;
pub mod registry;

mod pipeline;

pub use builder::{BaseDeclaration, PropertyDeclaration, SchemaBuilder, TypeDeclaration};
pub use config::{BuilderConfig, ConfigError, PropertyCase};
pub use convschema_meta as meta;
pub use error::{BuildError, ConfigurationError, ErrorClass, ModelError};
pub use graph::{SchemaElement, SchemaGraph};
pub use lookup::StructuralLookup;
pub use registry::ModelRegistry;
