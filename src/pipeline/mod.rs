//! Query pipeline module.
//!
//! Inbound operations that coordinate:
//! - Argument validation
//! - Filter composition and query building
//! - One store round trip
//! - Flattening, report formatting and derived views

pub mod context;
pub mod operations;

pub use context::*;
pub use operations::*;
