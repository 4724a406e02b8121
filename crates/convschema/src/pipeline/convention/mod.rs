//! Convention engine.
//!
//! Conventions only fill in what the caller left open: explicitly added
//! properties keep their declared facets, and types with a declared key
//! never get a conventional one.

mod dynamic;
mod foreign_key;
mod key;

pub(crate) use dynamic::resolve_dynamic_containers;
pub(crate) use foreign_key::discover_foreign_keys;
pub(crate) use key::{apply_key_convention, key_convention_rank};

use super::{BuildContext, shape};
use crate::node::{Capability, ConcurrencyMode, Multiplicity, PropertyConfiguration};
use convschema_meta::{Annotation, MemberDescriptor, TypeDescriptor};
use tracing::{debug, trace};

/// Whether a member of `level` is mapped without an explicit declaration.
pub(crate) fn is_mapped(level: &TypeDescriptor, member: &MemberDescriptor) -> bool {
    if member.has(&Annotation::NotMapped) || member.has(&Annotation::IgnoreDataMember) {
        return false;
    }

    // data contracts are opt-in per member
    !level.has(&Annotation::DataContract) || member.data_member().is_some()
}

/// Apply member annotations to every property the caller did not add.
pub(crate) fn apply_property_conventions(ctx: &mut BuildContext<'_>) {
    let source = ctx.source;
    let mut applied = 0usize;

    for node in ctx.registry.iter_mut() {
        for property in node.properties.iter_mut().filter(|p| !p.added_explicitly) {
            let Some(level) = source.descriptor(&property.declared_on) else {
                continue;
            };
            let Some(member) = shape::member_of(source, &property.declared_on, &property.member)
            else {
                continue;
            };

            if apply_annotations(level, member, property) {
                trace!(ty = %node.id, property = %property.name, "applied member annotations");
                applied += 1;
            }
        }
    }

    debug!(properties = applied, "applied property conventions");
}

// Returns true when any annotation changed the property.
fn apply_annotations(
    level: &TypeDescriptor,
    member: &MemberDescriptor,
    property: &mut PropertyConfiguration,
) -> bool {
    let before = property.clone();

    if level.has(&Annotation::DataContract)
        && let Some(Some(name)) = member.data_member()
    {
        property.name = name.to_string();
    }

    for annotation in &member.annotations {
        match annotation {
            Annotation::NotCountable => property.capabilities.restrict(Capability::Count),
            Annotation::NotExpandable => property.capabilities.restrict(Capability::Expand),
            Annotation::NonFilterable | Annotation::NotFilterable => {
                property.capabilities.restrict(Capability::Filter);
            }
            Annotation::NotNavigable => property.capabilities.restrict(Capability::Navigate),
            Annotation::NotSortable | Annotation::Unsortable => {
                property.capabilities.restrict(Capability::Sort);
            }
            Annotation::ConcurrencyCheck | Annotation::Timestamp => {
                property.concurrency = ConcurrencyMode::Fixed;
            }
            Annotation::Required => {
                property.nullable = false;
                if let Some(navigation) = &mut property.navigation
                    && navigation.multiplicity == Multiplicity::ZeroOrOne
                {
                    navigation.multiplicity = Multiplicity::One;
                }
            }
            Annotation::AutoExpand => {
                if let Some(navigation) = &mut property.navigation {
                    navigation.auto_expand = true;
                }
            }
            _ => {}
        }
    }

    *property != before
}

#[cfg(test)]
mod tests {
    use crate::{
        SchemaBuilder,
        node::{Capability, ConcurrencyMode, Multiplicity},
    };
    use convschema_meta::{Annotation, Primitive, TypeCatalog, TypeDescriptor, TypeId, ValueType};

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with(
                TypeDescriptor::structural("Shop", "Customer")
                    .annotate(Annotation::DataContract)
                    .annotated_member(
                        "Id",
                        Primitive::Int32,
                        &[Annotation::DataMember { name: None }],
                    )
                    .annotated_member(
                        "FullName",
                        Primitive::String,
                        &[Annotation::DataMember {
                            name: Some("name".to_string()),
                        }],
                    )
                    .member("Internal", Primitive::String)
                    .annotated_member(
                        "Version",
                        Primitive::Binary,
                        &[
                            Annotation::DataMember { name: None },
                            Annotation::Timestamp,
                            Annotation::NotFilterable,
                        ],
                    )
                    .annotated_member(
                        "Region",
                        ValueType::optional(ValueType::named("Shop.Region")),
                        &[
                            Annotation::DataMember { name: None },
                            Annotation::Required,
                            Annotation::AutoExpand,
                        ],
                    ),
            )
            .with(TypeDescriptor::structural("Shop", "Region").member("Id", Primitive::Int32))
    }

    #[test]
    fn data_contract_maps_only_data_members() {
        let catalog = catalog();
        let mut builder = SchemaBuilder::new(&catalog);
        builder.entity_set("Customers", "Shop.Customer");

        let graph = builder.build().expect("customer model should build");
        let customer = graph
            .structural_type(&TypeId::from("Shop.Customer"))
            .expect("customer");

        assert!(customer.property_by_member("Internal").is_none());
        let renamed = customer.property_by_member("FullName").expect("full name");
        assert_eq!(renamed.name, "name");
    }

    #[test]
    fn annotations_set_facets() {
        let catalog = catalog();
        let mut builder = SchemaBuilder::new(&catalog);
        builder.entity_set("Customers", "Shop.Customer");

        let graph = builder.build().expect("customer model should build");
        let customer = graph
            .structural_type(&TypeId::from("Shop.Customer"))
            .expect("customer");

        let version = customer.property("Version").expect("version");
        assert_eq!(version.concurrency, ConcurrencyMode::Fixed);
        assert!(!version.capabilities.allows(Capability::Filter));

        let region = customer.property("Region").expect("region");
        assert!(!region.nullable);
        assert_eq!(region.multiplicity(), Some(Multiplicity::One));
        assert!(region.navigation.as_ref().is_some_and(|n| n.auto_expand));
    }

    #[test]
    fn explicit_properties_ignore_annotations() {
        let catalog = catalog();
        let mut builder = SchemaBuilder::new(&catalog);
        builder
            .entity_set("Customers", "Shop.Customer")
            .property("FullName")
            .name("displayName");

        let graph = builder.build().expect("customer model should build");
        let customer = graph
            .structural_type(&TypeId::from("Shop.Customer"))
            .expect("customer");

        assert!(customer.property("name").is_none());
        let renamed = customer.property("displayName").expect("explicit name");
        assert!(renamed.added_explicitly);
    }

    #[test]
    fn alternate_capability_spellings_restrict_the_same_flag() {
        let catalog = TypeCatalog::new().with(
            TypeDescriptor::structural("Shop", "Ledger")
                .member("Id", Primitive::Int32)
                .annotated_member(
                    "Memo",
                    Primitive::String,
                    &[
                        Annotation::NonFilterable,
                        Annotation::Unsortable,
                        Annotation::NotCountable,
                        Annotation::NotExpandable,
                        Annotation::NotNavigable,
                    ],
                )
                .annotated_member(
                    "Code",
                    Primitive::String,
                    &[Annotation::NotFilterable, Annotation::NotSortable],
                ),
        );
        let mut builder = SchemaBuilder::new(&catalog);
        builder.entity_set("Ledgers", "Shop.Ledger");

        let graph = builder.build().expect("ledger model should build");
        let ledger = graph
            .structural_type(&TypeId::from("Shop.Ledger"))
            .expect("ledger");

        let memo = ledger.property("Memo").expect("memo");
        for capability in [
            Capability::Filter,
            Capability::Sort,
            Capability::Count,
            Capability::Expand,
            Capability::Navigate,
        ] {
            assert!(!memo.capabilities.allows(capability), "{capability:?} still allowed");
        }

        let code = ledger.property("Code").expect("code");
        assert!(!code.capabilities.allows(Capability::Filter));
        assert!(!code.capabilities.allows(Capability::Sort));
        assert!(code.capabilities.allows(Capability::Count));

        let id = ledger.property("Id").expect("id");
        assert!(id.capabilities.is_unrestricted());
    }
}
