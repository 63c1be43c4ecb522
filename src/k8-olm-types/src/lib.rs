mod crd;
mod csv;

pub use self::crd::*;
pub use self::csv::*;

/// value of `type` for OpenAPI array nodes
pub const TYPE_ARRAY: &str = "array";
