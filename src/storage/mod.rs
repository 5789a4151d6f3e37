//! Storage module.
//!
//! Build models, filter composition, aggregation query builders and the
//! document store client contract.

pub mod client;
pub mod filters;
pub mod models;
pub mod queries;

pub use client::*;
pub use filters::*;
pub use models::*;
pub use queries::*;
