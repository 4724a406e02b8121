use crate::{
    error::{BuildError, ConfigurationError},
    lookup::StructuralLookup,
    node::{PropertyKind, StructuralTypeConfiguration},
    pipeline::BuildContext,
};
use convschema_meta::TypeId;
use tracing::{debug, trace};

fn own_containers(node: &StructuralTypeConfiguration) -> Vec<&str> {
    node.properties
        .iter()
        .filter(|p| p.kind == PropertyKind::DynamicPropertyContainer)
        .map(|p| p.name.as_str())
        .collect()
}

/// Mark open types. A hierarchy level may declare at most one dynamic
/// property container, and only when no ancestor already has one.
pub(crate) fn resolve_dynamic_containers(ctx: &mut BuildContext<'_>) -> Result<(), BuildError> {
    let mut resolved: Vec<(TypeId, Option<String>, bool)> = Vec::new();

    for node in ctx.registry.iter() {
        let own = own_containers(node);
        if let [first, second, ..] = own.as_slice() {
            return Err(ConfigurationError::DuplicateDynamicContainer {
                ty: node.id.clone(),
                first: (*first).to_string(),
                second: (*second).to_string(),
            }
            .into());
        }

        let inherited = ctx
            .registry
            .base_chain(&node.id)
            .into_iter()
            .skip(1)
            .find_map(|level| own_containers(level).first().map(|name| (*name).to_string()));

        if let (Some(first), Some(second)) = (&inherited, own.first()) {
            return Err(ConfigurationError::DuplicateDynamicContainer {
                ty: node.id.clone(),
                first: first.clone(),
                second: (*second).to_string(),
            }
            .into());
        }

        let own = own.first().map(|name| (*name).to_string());
        let is_open = own.is_some() || inherited.is_some();
        resolved.push((node.id.clone(), own, is_open));
    }

    let mut open = 0usize;
    for (id, container, is_open) in resolved {
        if let Some(node) = ctx.registry.get_mut(&id) {
            if let Some(name) = &container {
                trace!(ty = %id, container = %name, "dynamic property container");
            }
            node.dynamic_container = container;
            node.is_open = is_open;
            open += usize::from(is_open);
        }
    }

    debug!(types = open, "resolved open types");

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        SchemaBuilder,
        error::{BuildError, ConfigurationError},
    };
    use convschema_meta::{Primitive, TypeCatalog, TypeDescriptor, TypeId, ValueType};

    #[test]
    fn derived_type_inherits_open_container() {
        let catalog = TypeCatalog::new()
            .with(
                TypeDescriptor::structural("NS", "Document")
                    .member("Id", Primitive::Int32)
                    .member("Extra", ValueType::dynamic_properties()),
            )
            .with(
                TypeDescriptor::structural("NS", "Invoice")
                    .base("NS.Document")
                    .member("Total", Primitive::Decimal),
            );

        let mut builder = SchemaBuilder::new(&catalog);
        builder.entity_set("Documents", "NS.Document");

        let graph = builder.build().expect("open model should build");
        let invoice = graph
            .structural_type(&TypeId::from("NS.Invoice"))
            .expect("derived type is pulled in");
        assert!(invoice.is_open);
        assert!(invoice.dynamic_container.is_none());
        assert_eq!(graph.dynamic_container(&TypeId::from("NS.Invoice")), Some("Extra"));
    }

    #[test]
    fn container_on_base_and_derived_fails() {
        let catalog = TypeCatalog::new()
            .with(
                TypeDescriptor::structural("NS", "Document")
                    .member("Id", Primitive::Int32)
                    .member("Extra", ValueType::dynamic_properties()),
            )
            .with(
                TypeDescriptor::structural("NS", "Invoice")
                    .base("NS.Document")
                    .member("More", ValueType::dynamic_properties()),
            );

        let mut builder = SchemaBuilder::new(&catalog);
        builder.entity_set("Documents", "NS.Document");

        let err = builder.build().expect_err("second container must fail");
        match err {
            BuildError::Configuration(ConfigurationError::DuplicateDynamicContainer {
                ty,
                first,
                second,
            }) => {
                assert_eq!(ty, TypeId::from("NS.Invoice"));
                assert_eq!(first, "Extra");
                assert_eq!(second, "More");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn two_containers_on_one_type_fail() {
        let catalog = TypeCatalog::new().with(
            TypeDescriptor::structural("NS", "Bag")
                .member("Id", Primitive::Int32)
                .member("A", ValueType::dynamic_properties())
                .member("B", ValueType::dynamic_properties()),
        );

        let mut builder = SchemaBuilder::new(&catalog);
        builder.complex_type("NS.Bag");

        let err = builder.build().expect_err("two containers must fail");
        let rendered = err.to_string();
        assert!(rendered.contains("'NS.Bag'"), "got: {rendered}");
        assert!(rendered.contains("'A'"), "got: {rendered}");
        assert!(rendered.contains("'B'"), "got: {rendered}");
    }
}
