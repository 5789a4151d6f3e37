//! Structured logging with query context.
//!
//! Provides logging macros and utilities that include the query id and
//! operation name in every log message for easy correlation.

pub mod structured;

pub use structured::*;

/// Initialize the process logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
