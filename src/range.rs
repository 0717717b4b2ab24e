pub mod model;
pub mod validate;

pub use model::{NewRange, Range, RangeKind, RangeUpdate};
pub use validate::{Validation, validate};
