//! Response extraction module.
//!
//! Turns raw aggregation responses into typed records:
//! - JSON path helpers over buckets, keys and counts
//! - Bucket tree flattening for latest-build queries
//! - Report formatting for pass/fail/total day series

pub mod flatten;
pub mod json_path;
pub mod report;

pub use flatten::*;
pub use json_path::*;
pub use report::*;
