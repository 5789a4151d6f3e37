//! Query-scoped structured logging.
//!
//! Events are written as `EVENT key=value ...`. Inbound operations prefix
//! them with a [`LogContext`] naming the query, the operation, the index
//! pattern searched and, for latest-build queries, the grouping depth. The
//! extraction and HTTP layers run without a context and log bare events
//! through the same macros.

use std::fmt;

/// Identity of one inbound operation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub query_id: String,
    pub operation: String,
    pub index: String,
    /// Number of grouping levels requested, when the query nests buckets.
    pub depth: Option<usize>,
}

impl LogContext {
    pub fn new(query_id: &str, operation: &str, index: &str) -> Self {
        Self {
            query_id: query_id.to_string(),
            operation: operation.to_string(),
            index: index.to_string(),
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[query={}] [op={}] [index={}]",
            self.query_id, self.operation, self.index
        )?;
        if let Some(depth) = self.depth {
            write!(f, " [depth={}]", depth)?;
        }
        Ok(())
    }
}

/// Emit one `EVENT key=value` line at `$level`.
///
/// A string literal in first position is a bare event; anything else is
/// taken as a context to prefix.
#[doc(hidden)]
#[macro_export]
macro_rules! log_event {
    ($level:expr, $event:literal $(, $key:ident = $value:expr)*) => {
        log::log!(
            $level,
            "{} {}",
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        )
    };
    ($level:expr, $ctx:expr, $event:expr $(, $key:ident = $value:expr)*) => {
        log::log!(
            $level,
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::log_event!(log::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => {
        $crate::log_event!(log::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::log_event!(log::Level::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::log_event!(log::Level::Debug, $($arg)+)
    };
}
