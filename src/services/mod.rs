//! Capability layer: single-record abilities, no resource ownership.

pub mod field_filler;

pub use field_filler::FieldFiller;
