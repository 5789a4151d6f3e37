//! Configuration module.
//!
//! Store connection settings loaded from environment variables.

pub mod store;

pub use store::*;
