//! Filter composition.
//!
//! Builds equality and time-range predicates that are ANDed at the root of
//! every compiled request.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{json, Value};

/// Timestamp field carried by every build-event document.
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Number of calendar days covered by a weekly report, today included.
pub const WINDOW_DAYS: i64 = 7;

/// Store date format used for day-precision boundaries and day keys.
pub const DAY_FORMAT: &str = "yyyy-MM-dd";

/// A single predicate over the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Exact match of `field` against `value`.
    Term { field: String, value: String },
    /// Day-precision range over `field`, both ends inclusive.
    Range {
        field: String,
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl Filter {
    pub fn term(field: &str, value: &str) -> Self {
        Filter::Term {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Render the store query clause for this filter.
    ///
    /// Range boundaries use `||/d` rounding so `gte` snaps to the start of
    /// `from` and `lte` to the end of `to`.
    pub fn to_query(&self) -> Value {
        match self {
            Filter::Term { field, value } => json!({ "term": { field: value } }),
            Filter::Range { field, from, to } => json!({
                "range": {
                    field: {
                        "gte": format!("{}||/d", from.format("%Y-%m-%d")),
                        "lte": format!("{}||/d", to.format("%Y-%m-%d")),
                    }
                }
            }),
        }
    }
}

/// Turn `(field, value)` pairs into equality filters.
///
/// Fields must already name the exact-match (keyword) variant.
pub fn compose(pairs: &[(&str, &str)]) -> Vec<Filter> {
    pairs
        .iter()
        .map(|(field, value)| Filter::term(field, value))
        .collect()
}

/// The seven calendar days ending on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl WeekWindow {
    /// Window ending today, read from the clock at each call.
    pub fn current() -> Self {
        Self::ending_at(Utc::now())
    }

    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let to = now.date_naive();
        Self {
            from: to - Duration::days(WINDOW_DAYS - 1),
            to,
        }
    }

    /// Every day of the window in ascending order.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.from.iter_days().take_while(|d| *d <= self.to).collect()
    }

    pub fn filter(&self) -> Filter {
        Filter::Range {
            field: TIMESTAMP_FIELD.to_string(),
            from: self.from,
            to: self.to,
        }
    }
}

/// Range filter covering the last seven days, computed at call time.
pub fn week_window() -> Filter {
    WeekWindow::current().filter()
}

/// [`week_window`] against an explicit clock reading.
pub fn week_window_at(now: DateTime<Utc>) -> Filter {
    WeekWindow::ending_at(now).filter()
}

/// AND the filters together as a boolean query; `None` matches everything.
pub fn bool_filter(filters: &[Filter]) -> Option<Value> {
    if filters.is_empty() {
        return None;
    }
    let clauses: Vec<Value> = filters.iter().map(Filter::to_query).collect();
    Some(json!({ "bool": { "filter": clauses } }))
}
