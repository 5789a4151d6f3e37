//! Query context management.
//!
//! Carries the injected store client and configuration through every
//! operation, mints per-call log contexts and decides which week a report
//! covers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::logging::structured::LogContext;
use crate::storage::client::SearchClient;
use crate::storage::filters::WeekWindow;

/// Everything an operation needs besides its own arguments.
#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    pub client: &'a dyn SearchClient,
    pub config: &'a StoreConfig,
    /// Fixed clock reading; `None` reads the system clock per call.
    pub now: Option<DateTime<Utc>>,
}

impl<'a> QueryContext<'a> {
    pub fn new(client: &'a dyn SearchClient, config: &'a StoreConfig) -> Self {
        Self {
            client,
            config,
            now: None,
        }
    }

    /// Evaluate report windows against `now` instead of the system clock.
    pub fn with_clock(self, now: DateTime<Utc>) -> Self {
        Self {
            now: Some(now),
            ..self
        }
    }

    /// The seven days a report issued through this context covers.
    pub fn window(&self) -> WeekWindow {
        match self.now {
            Some(now) => WeekWindow::ending_at(now),
            None => WeekWindow::current(),
        }
    }

    /// Fresh log context for one operation call.
    pub fn log_context(&self, operation: &str) -> LogContext {
        let query_id = format!("q-{}", &Uuid::new_v4().simple().to_string()[..8]);
        LogContext::new(&query_id, operation, &self.config.index_pattern)
    }
}

impl std::fmt::Debug for QueryContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryContext")
            .field("config", self.config)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
