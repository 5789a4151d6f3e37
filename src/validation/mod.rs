//! Validation module.
//!
//! Caller-supplied identifiers are checked before any store round trip.

pub mod arguments;

pub use arguments::*;
