//! BuildLens Core - Aggregation query engine for build/CI reporting
//!
//! This crate compiles build-reporting questions into nested bucket
//! aggregations against a document store, and flattens the bucket trees that
//! come back into typed records. The implementation prioritizes:
//!
//! 1. **Determinism** - Records keep the store's bucket order, never re-sorted
//! 2. **Logging** - Every operation logged with a query id for correlation
//! 3. **Injectability** - The store is a one-method trait, swappable in tests
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - Inbound operations over an injected store client
//! - `storage` - Models, filter composition, query builders, store client
//! - `extraction` - Bucket tree flattening and report formatting
//! - `projection` - Distinct project/subsystem/component views
//! - `validation` - Identifier checks before any store call
//! - `config` - Store settings from the environment
//! - `logging` - Structured logging with query context

pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod storage;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use error::{Error, Result};
pub use logging::init_logger;
pub use pipeline::context::QueryContext;
pub use storage::client::{HttpSearchClient, SearchClient};
