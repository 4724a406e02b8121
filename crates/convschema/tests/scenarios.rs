mod fixtures;

use convschema::{
    BuildError, ErrorClass, ModelError, SchemaBuilder, SchemaElement, StructuralLookup,
    meta::TypeId,
    node::{ContainerKind, KeySource, Multiplicity, PropertyKind},
};

fn id(s: &str) -> TypeId {
    TypeId::from(s)
}

//
// products
//

#[test]
fn products_graph_has_three_types() {
    let catalog = fixtures::products();
    let mut builder = SchemaBuilder::new(&catalog);
    builder.entity_set("Products", "Shop.Product");

    let graph = builder.build().expect("products model should build");
    let names = graph
        .schema_elements()
        .map(|element| element.id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Shop.Category", "Shop.Product", "Shop.ProductVersion"]
    );
    assert!(graph.structural_type(&id("Shop.Warehouse")).is_none());

    let products = graph.entity_set("Products").expect("products set");
    let key = graph.key_of(&products.entity_type).expect("product key");
    assert_eq!(key.properties, vec!["ID".to_string()]);
    assert_eq!(key.source, KeySource::Convention);

    let product = graph.structural_type(&id("Shop.Product")).expect("product");
    let navigations = product.navigation_properties().collect::<Vec<_>>();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].name, "Category");
    assert_eq!(navigations[0].multiplicity(), Some(Multiplicity::ZeroOrOne));

    let version = product.property("Version").expect("version");
    assert_eq!(version.kind, PropertyKind::Complex);
    assert!(matches!(
        graph
            .schema_elements()
            .find(|e| e.id() == &id("Shop.ProductVersion")),
        Some(SchemaElement::Complex(_))
    ));
}

#[test]
fn products_key_is_not_nullable() {
    let catalog = fixtures::products();
    let mut builder = SchemaBuilder::new(&catalog);
    builder.entity_set("Products", "Shop.Product");

    let graph = builder.build().expect("products model should build");
    let product = graph.structural_type(&id("Shop.Product")).expect("product");
    assert!(!product.property("ID").expect("id").nullable);
    assert!(!product.property("Name").expect("name").nullable);
}

//
// vehicles
//

fn vehicle_builder(catalog: &convschema::meta::TypeCatalog) -> SchemaBuilder<'_> {
    let mut builder = SchemaBuilder::new(catalog);
    builder.entity_set("Vehicles", "Fleet.Vehicle").key("Model").key("Name");
    builder.entity_set("Manufacturers", "Fleet.VehicleManufacturer");
    builder.entity_set("MotorcycleManufacturers", "Fleet.MotorcycleManufacturer");
    builder
}

#[test]
fn vehicle_graph_has_ten_elements() {
    let catalog = fixtures::vehicles();
    let graph = vehicle_builder(&catalog)
        .build()
        .expect("vehicle model should build");

    assert_eq!(graph.schema_elements().count(), 10);
    assert_eq!(graph.entity_types().count(), 7);
    assert_eq!(graph.complex_types().count(), 3);

    let abstract_entities = graph
        .entity_types()
        .filter(|node| node.is_abstract)
        .map(|node| node.id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(abstract_entities, vec!["Fleet.Vehicle"]);
}

#[test]
fn vehicle_hierarchy_links_and_keys() {
    let catalog = fixtures::vehicles();
    let graph = vehicle_builder(&catalog)
        .build()
        .expect("vehicle model should build");

    let chain = graph
        .base_chain(&id("Fleet.SportBike"))
        .into_iter()
        .map(|node| node.id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        chain,
        vec!["Fleet.SportBike", "Fleet.Motorcycle", "Fleet.Vehicle"]
    );

    let key = graph.key_of(&id("Fleet.SportBike")).expect("inherited key");
    assert_eq!(key.properties, vec!["Model".to_string(), "Name".to_string()]);
    assert_eq!(key.source, KeySource::Explicit);

    // each level keeps only its own properties
    let sport_bike = graph.structural_type(&id("Fleet.SportBike")).expect("sport bike");
    assert_eq!(sport_bike.properties.len(), 1);
    let all = graph
        .properties_of(&id("Fleet.SportBike"))
        .into_iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        all,
        vec![
            "Model",
            "Name",
            "WheelCount",
            "CanDoAWheelie",
            "Manufacturer",
            "TopSpeed"
        ]
    );
}

#[test]
fn sport_bike_manufacturer_binds_to_motorcycle_manufacturers() {
    let catalog = fixtures::vehicles();
    let graph = vehicle_builder(&catalog)
        .build()
        .expect("vehicle model should build");

    let motorcycle = graph
        .binding("Vehicles", "Fleet.Motorcycle/Manufacturer")
        .expect("motorcycle manufacturer is bound");
    assert_eq!(motorcycle.target, "MotorcycleManufacturers");
    assert_eq!(motorcycle.declaring_type, "Fleet.Motorcycle");

    // SportBike sees the navigation through its base type
    let (level, manufacturer) = graph
        .find_property(&id("Fleet.SportBike"), "Manufacturer")
        .expect("inherited navigation");
    assert_eq!(level.id, motorcycle.declaring_type);
    assert_eq!(manufacturer.target, Some(id("Fleet.MotorcycleManufacturer")));

    // no car manufacturer set: fall back to the base manufacturer set
    let car = graph
        .binding("Vehicles", "Fleet.Car/Manufacturer")
        .expect("car manufacturer is bound");
    assert_eq!(car.target, "Manufacturers");
    assert_eq!(car.target_kind, ContainerKind::EntitySet);
}

#[test]
fn derived_complex_types_are_discovered() {
    let catalog = fixtures::vehicles();
    let graph = vehicle_builder(&catalog)
        .build()
        .expect("vehicle model should build");

    let derived = graph
        .derived_types(&id("Fleet.ManufacturerAddress"))
        .map(|node| node.id.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        derived,
        vec![
            "Fleet.CarManufacturerAddress",
            "Fleet.MotorcycleManufacturerAddress"
        ]
    );
    for node in graph.derived_types(&id("Fleet.ManufacturerAddress")) {
        assert!(node.is_complex());
        assert!(!node.added_explicitly);
    }
}

//
// keys
//

#[test]
fn keyless_base_with_keyed_derived_type_builds() {
    let catalog = fixtures::creatures();
    let mut builder = SchemaBuilder::new(&catalog);
    builder.entity_type("Zoo.Creature");
    builder.entity_set("Dogs", "Zoo.Dog").key("License");

    let graph = builder.build().expect("keyed derived type is allowed");
    let creature = graph.structural_type(&id("Zoo.Creature")).expect("creature");
    assert!(creature.is_entity());
    assert!(graph.key_of(&id("Zoo.Creature")).is_none());

    let key = graph.key_of(&id("Zoo.Puppy")).expect("puppy inherits the dog key");
    assert_eq!(key.properties, vec!["License".to_string()]);
}

#[test]
fn second_level_key_is_a_duplicate() {
    let catalog = fixtures::creatures();
    let mut builder = SchemaBuilder::new(&catalog);
    builder.entity_type("Zoo.Creature");
    builder.entity_set("Dogs", "Zoo.Dog").key("License");
    builder.entity_type("Zoo.Puppy").key("Chip");

    let err = builder.build().expect_err("second key must fail");
    assert_eq!(err.class(), ErrorClass::InvalidModel);
    match &err {
        BuildError::Model(ModelError::DuplicateKey { ty, ancestor }) => {
            assert_eq!(ty, "Zoo.Puppy");
            assert_eq!(ancestor, "Zoo.Dog");
        }
        other => panic!("unexpected error: {other}"),
    }

    let rendered = err.to_string();
    assert!(rendered.contains("'Zoo.Puppy'"), "got: {rendered}");
    assert!(rendered.contains("'Zoo.Dog'"), "got: {rendered}");
}
