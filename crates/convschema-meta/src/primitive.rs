use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// Scalar value types understood by the schema without further
/// classification. Named after their schema-level spelling.
///

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[remain::sorted]
pub enum Primitive {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    TimeOfDay,
}

impl Primitive {
    #[must_use]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::SByte | Self::Int16 | Self::Int32 | Self::Int64
        )
    }

    #[must_use]
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Single | Self::Double)
    }

    // floating point values have no stable identity
    #[must_use]
    pub const fn supports_key(self) -> bool {
        !self.is_floating()
    }

    /// Qualified schema name, e.g. `Edm.Int32`.
    #[must_use]
    pub fn schema_name(self) -> String {
        format!("Edm.{self}")
    }
}
