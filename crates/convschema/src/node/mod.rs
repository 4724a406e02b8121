mod container;
mod r#enum;
mod property;
mod structural;

pub use self::container::*;
pub use self::r#enum::*;
pub use self::property::*;
pub use self::structural::*;
