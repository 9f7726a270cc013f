pub mod entity;
pub mod invariants;

pub use entity::{DurationTotal, Serial};
pub use invariants::validate_serial;
