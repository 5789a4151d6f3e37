//! Document store configuration from environment variables.

use std::env;

pub const DEFAULT_HOST: &str = "http://localhost:9200";
pub const DEFAULT_INDEX_PATTERN: &str = "ngcc-*";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_BUCKET_SIZE: usize = 500;

/// Settings for reaching the document store and shaping aggregation requests.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Base URL of the store, always carrying a scheme.
    pub host: String,

    /// Wildcard index pattern covering every build-event index.
    pub index_pattern: String,

    /// Per-request timeout applied by the HTTP client.
    pub timeout_ms: u64,

    /// Maximum number of buckets requested per grouping level.
    pub bucket_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            index_pattern: DEFAULT_INDEX_PATTERN.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `ELASTICSEARCH_HOST` (default: http://localhost:9200)
    /// - `BUILDLENS_INDEX_PATTERN` (default: ngcc-*)
    /// - `ELASTICSEARCH_TIMEOUT_MS` (default: 10000)
    /// - `BUILDLENS_BUCKET_SIZE` (default: 500)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparsable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ELASTICSEARCH_HOST")
            .map(|h| h.trim().trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty())
            .map(|h| {
                if h.starts_with("http://") || h.starts_with("https://") {
                    h
                } else {
                    format!("http://{}", h)
                }
            })
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self {
            host,

            index_pattern: lookup("BUILDLENS_INDEX_PATTERN")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INDEX_PATTERN.to_string()),

            timeout_ms: lookup("ELASTICSEARCH_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),

            bucket_size: lookup("BUILDLENS_BUCKET_SIZE")
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(DEFAULT_BUCKET_SIZE),
        }
    }
}
