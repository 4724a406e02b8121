mod fixtures;

use convschema::{SchemaBuilder, meta::TypeCatalog};
use proptest::prelude::*;

///
/// Registration
///

#[derive(Clone, Copy, Debug)]
enum Registration {
    HumanEntity,
    ZooEntity,
    AddressComplex,
    ZooSet,
    IgnoreSecret,
}

fn register(builder: &mut SchemaBuilder<'_>, registration: Registration) {
    match registration {
        Registration::HumanEntity => {
            builder.entity_type("Zoo.Human");
        }
        Registration::ZooEntity => {
            builder.entity_type("Zoo.Zoo");
        }
        Registration::AddressComplex => {
            builder.complex_type("Zoo.Address");
        }
        Registration::ZooSet => {
            builder.entity_set("Zoos", "Zoo.Zoo");
        }
        Registration::IgnoreSecret => {
            builder.ignore("Zoo.Secret");
        }
    }
}

fn build_in_order(catalog: &TypeCatalog, order: &[Registration]) -> convschema::SchemaGraph {
    let mut builder = SchemaBuilder::new(catalog);
    for registration in order {
        register(&mut builder, *registration);
    }

    builder.build().expect("zoo model should build in any order")
}

fn registrations() -> Vec<Registration> {
    vec![
        Registration::HumanEntity,
        Registration::ZooEntity,
        Registration::AddressComplex,
        Registration::ZooSet,
        Registration::IgnoreSecret,
    ]
}

#[test]
fn human_then_zoo_matches_zoo_then_human() {
    let catalog = fixtures::zoo();

    let first = build_in_order(
        &catalog,
        &[Registration::HumanEntity, Registration::ZooSet],
    );
    let second = build_in_order(
        &catalog,
        &[Registration::ZooSet, Registration::HumanEntity],
    );

    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn registration_order_does_not_change_the_graph(
        order in Just(registrations()).prop_shuffle()
    ) {
        let catalog = fixtures::zoo();
        let expected = build_in_order(&catalog, &registrations());
        let actual = build_in_order(&catalog, &order);

        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn building_twice_yields_equal_graphs(
        order in Just(registrations()).prop_shuffle()
    ) {
        let catalog = fixtures::zoo();
        let mut builder = SchemaBuilder::new(&catalog);
        for registration in &order {
            register(&mut builder, *registration);
        }

        let first = builder.build().expect("first build");
        let second = builder.build().expect("second build");
        prop_assert_eq!(first, second);
    }
}
