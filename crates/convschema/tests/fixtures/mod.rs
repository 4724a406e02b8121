//! Shared metadata catalogs for end-to-end scenarios.

#![allow(dead_code)]

use convschema::meta::{Annotation, Primitive, TypeCatalog, TypeDescriptor, ValueType};

fn optional(id: &str) -> ValueType {
    ValueType::optional(ValueType::named(id))
}

fn many(id: &str) -> ValueType {
    ValueType::collection(ValueType::named(id))
}

/// Product with a complex version and an optional category.
pub fn products() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::structural("Shop", "Product")
                .member("ID", Primitive::Int32)
                .member("Name", Primitive::String)
                .member("Version", ValueType::named("Shop.ProductVersion"))
                .member("Category", optional("Shop.Category")),
        )
        .with(
            TypeDescriptor::structural("Shop", "ProductVersion")
                .member("Major", Primitive::Int32)
                .member("Minor", Primitive::Int32),
        )
        .with(
            TypeDescriptor::structural("Shop", "Category")
                .member("ID", Primitive::Int32)
                .member("Name", Primitive::String),
        )
        .with(
            TypeDescriptor::structural("Shop", "Warehouse")
                .member("ID", Primitive::Int32)
                .member("Stock", many("Shop.Product")),
        )
}

/// Vehicles and manufacturers, each with a parallel derived hierarchy.
pub fn vehicles() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::structural("Fleet", "Vehicle")
                .abstract_type()
                .member("Model", Primitive::Int32)
                .member("Name", Primitive::String)
                .member("WheelCount", Primitive::Int32),
        )
        .with(
            TypeDescriptor::structural("Fleet", "Motorcycle")
                .base("Fleet.Vehicle")
                .member("CanDoAWheelie", Primitive::Boolean)
                .member("Manufacturer", optional("Fleet.MotorcycleManufacturer")),
        )
        .with(
            TypeDescriptor::structural("Fleet", "SportBike")
                .base("Fleet.Motorcycle")
                .member("TopSpeed", Primitive::Int32),
        )
        .with(
            TypeDescriptor::structural("Fleet", "Car")
                .base("Fleet.Vehicle")
                .member("SeatingCapacity", Primitive::Int32)
                .member("Manufacturer", optional("Fleet.CarManufacturer")),
        )
        .with(
            TypeDescriptor::structural("Fleet", "VehicleManufacturer")
                .member("Id", Primitive::Int32)
                .member("Name", Primitive::String)
                .member("Address", ValueType::named("Fleet.ManufacturerAddress")),
        )
        .with(
            TypeDescriptor::structural("Fleet", "MotorcycleManufacturer")
                .base("Fleet.VehicleManufacturer"),
        )
        .with(
            TypeDescriptor::structural("Fleet", "CarManufacturer")
                .base("Fleet.VehicleManufacturer"),
        )
        .with(
            TypeDescriptor::structural("Fleet", "ManufacturerAddress")
                .member("Street", Primitive::String)
                .member("City", Primitive::String),
        )
        .with(
            TypeDescriptor::structural("Fleet", "CarManufacturerAddress")
                .base("Fleet.ManufacturerAddress")
                .member("DealerCount", Primitive::Int32),
        )
        .with(
            TypeDescriptor::structural("Fleet", "MotorcycleManufacturerAddress")
                .base("Fleet.ManufacturerAddress")
                .member("TrackCount", Primitive::Int32),
        )
}

/// Keyless base, keyed derived type, and a second derived level.
pub fn creatures() -> TypeCatalog {
    TypeCatalog::new()
        .with(TypeDescriptor::structural("Zoo", "Creature").member("Name", Primitive::String))
        .with(
            TypeDescriptor::structural("Zoo", "Dog")
                .base("Zoo.Creature")
                .member("License", Primitive::String),
        )
        .with(
            TypeDescriptor::structural("Zoo", "Puppy")
                .base("Zoo.Dog")
                .member("Chip", Primitive::String),
        )
}

/// Zoo and keeper referencing each other, plus an unmapped secret.
pub fn zoo() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::structural("Zoo", "Zoo")
                .member("Id", Primitive::Int32)
                .member("Keeper", optional("Zoo.Human"))
                .member("Location", ValueType::named("Zoo.Address"))
                .annotated_member("Vault", optional("Zoo.Secret"), &[Annotation::NotMapped]),
        )
        .with(
            TypeDescriptor::structural("Zoo", "Human")
                .member("HumanId", Primitive::Int32)
                .member("Name", Primitive::String)
                .member("Zoo", optional("Zoo.Zoo"))
                .member("Home", ValueType::named("Zoo.Address")),
        )
        .with(
            TypeDescriptor::structural("Zoo", "Address")
                .member("Street", Primitive::String)
                .member("City", Primitive::String),
        )
        .with(
            TypeDescriptor::structural("Zoo", "Secret")
                .member("Id", Primitive::Int32)
                .member("Code", Primitive::String),
        )
}

/// A complex type that contains itself without a collection in between.
pub fn recursive() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::structural("Org", "Department")
                .member("Id", Primitive::Int32)
                .member("Head", ValueType::named("Org.Position")),
        )
        .with(
            TypeDescriptor::structural("Org", "Position")
                .member("Title", Primitive::String)
                .member("ReportsTo", optional("Org.Position")),
        )
}

/// Open types: a document base with a dynamic property bag.
pub fn documents() -> TypeCatalog {
    TypeCatalog::new()
        .with(
            TypeDescriptor::structural("Docs", "Document")
                .member("Id", Primitive::Int32)
                .member("Title", Primitive::String)
                .member("Properties", ValueType::dynamic_properties()),
        )
        .with(
            TypeDescriptor::structural("Docs", "Memo")
                .base("Docs.Document")
                .member("Audience", Primitive::String),
        )
        .with(
            TypeDescriptor::structural("Docs", "Letter")
                .base("Docs.Document")
                .member("Extras", ValueType::dynamic_properties()),
        )
}
