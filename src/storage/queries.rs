//! Aggregation query builders.
//!
//! Compiles domain queries into nested bucket-aggregation requests.
//! Execution is handled by a [`SearchClient`](super::client::SearchClient).

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::storage::filters::{bool_filter, Filter, WeekWindow, DAY_FORMAT, TIMESTAMP_FIELD};
use crate::storage::models::Dimension;

/// Name of the top-hit aggregation at the innermost bucket level.
pub const LATEST_HIT_AGG: &str = "latest_build";

/// Name of the day histogram under each status aggregation.
pub const DAY_AGG: &str = "by_day";

pub const PASS_AGG: &str = "pass";
pub const FAIL_AGG: &str = "fail";
pub const TOTAL_AGG: &str = "total";

pub const TOTAL_PASS_AGG: &str = "total_pass";
pub const TOTAL_FAIL_AGG: &str = "total_fail";
pub const TOTAL_PASS_AND_FAIL_AGG: &str = "total_pass_and_fail";

pub const STATUS_FIELD: &str = "status.keyword";
pub const ACTION_FIELD: &str = "action.keyword";
pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const STATUS_FAILURE: &str = "FAILURE";

/// Fields projected from the latest document of each leaf bucket.
pub const LATEST_BUILD_FIELDS: [&str; 14] = [
    "project",
    "subsystem",
    "component",
    "environment",
    "buildVersion",
    "buildUrl",
    "buildId",
    "buildStatus",
    "action",
    "status",
    "commits",
    "tickets",
    "gitRemote",
    "@timestamp",
];

/// A compiled request: target index pattern plus search body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: Value,
}

/// Build the "latest document per leaf bucket" request.
///
/// One `terms` level per dimension, outermost first, ending in a size-1
/// `top_hits` sorted by timestamp descending. Filters are ANDed once at the
/// root. Sibling buckets keep the store's default order (document count
/// descending).
pub fn build_latest_query(
    config: &StoreConfig,
    dimensions: &[Dimension],
    filters: &[Filter],
    fields_to_return: &[&str],
) -> Result<SearchRequest> {
    if dimensions.is_empty() {
        return Err(Error::InvalidArguments(
            "at least one grouping dimension is required".to_string(),
        ));
    }

    let mut aggs = json!({
        LATEST_HIT_AGG: {
            "top_hits": {
                "size": 1,
                "sort": [{ TIMESTAMP_FIELD: { "order": "desc" } }],
                "_source": { "includes": fields_to_return },
            }
        }
    });

    for dimension in dimensions.iter().rev() {
        aggs = json!({
            dimension.agg_name(): {
                "terms": {
                    "field": dimension.keyword_field(),
                    "size": config.bucket_size,
                },
                "aggs": aggs,
            }
        });
    }

    Ok(SearchRequest {
        index: config.index_pattern.clone(),
        body: with_query(json!({ "size": 0, "aggs": aggs }), filters),
    })
}

/// Build the per-environment pass/fail/total report request.
///
/// Each status class is restricted to `window` and bucketed by day with
/// zero-fill, so every series has one entry per day of the window. The three
/// cross-environment sums are computed by the store over the same status
/// classes, so they always equal the sum of the day series.
pub fn build_weekly_report_query(
    config: &StoreConfig,
    filters: &[Filter],
    window: &WeekWindow,
) -> SearchRequest {
    let environment = Dimension::Environment;
    let env_agg = environment.agg_name();

    let body = json!({
        "size": 0,
        "aggs": {
            env_agg: {
                "terms": {
                    "field": environment.keyword_field(),
                    "size": config.bucket_size,
                },
                "aggs": {
                    PASS_AGG: status_class(json!({ "term": { STATUS_FIELD: STATUS_SUCCESS } }), window),
                    FAIL_AGG: status_class(json!({ "term": { STATUS_FIELD: STATUS_FAILURE } }), window),
                    TOTAL_AGG: status_class(
                        json!({ "terms": { STATUS_FIELD: [STATUS_SUCCESS, STATUS_FAILURE] } }),
                        window,
                    ),
                },
            },
            TOTAL_PASS_AGG: sum_bucket(&format!("{}>{}>_count", env_agg, PASS_AGG)),
            TOTAL_FAIL_AGG: sum_bucket(&format!("{}>{}>_count", env_agg, FAIL_AGG)),
            TOTAL_PASS_AND_FAIL_AGG: sum_bucket(&format!("{}>{}>_count", env_agg, TOTAL_AGG)),
        }
    });

    SearchRequest {
        index: config.index_pattern.clone(),
        body: with_query(body, filters),
    }
}

/// A status sub-aggregation restricted to the window and bucketed by day.
fn status_class(status: Value, window: &WeekWindow) -> Value {
    let from = window.from.format("%Y-%m-%d").to_string();
    let to = window.to.format("%Y-%m-%d").to_string();
    json!({
        "filter": {
            "bool": { "filter": [status, window.filter().to_query()] }
        },
        "aggs": {
            DAY_AGG: {
                "date_histogram": {
                    "field": TIMESTAMP_FIELD,
                    "calendar_interval": "day",
                    "format": DAY_FORMAT,
                    "min_doc_count": 0,
                    "order": { "_key": "asc" },
                    "extended_bounds": { "min": from, "max": to },
                    "hard_bounds": { "min": from, "max": to },
                }
            }
        }
    })
}

fn sum_bucket(path: &str) -> Value {
    json!({ "sum_bucket": { "buckets_path": path } })
}

fn with_query(mut body: Value, filters: &[Filter]) -> Value {
    if let (Some(query), Value::Object(obj)) = (bool_filter(filters), &mut body) {
        obj.insert("query".to_string(), query);
    }
    body
}

/// Aggregation names nested under `aggs`, outermost first (for diagnostics).
pub fn aggregation_path(body: &Value) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = body.get("aggs").and_then(Value::as_object);
    while let Some(aggs) = current {
        let next: Option<(&String, &Map<String, Value>)> = aggs
            .iter()
            .find_map(|(name, agg)| agg.get("aggs").and_then(Value::as_object).map(|a| (name, a)));
        match next {
            Some((name, inner)) => {
                path.push(name.clone());
                current = Some(inner);
            }
            None => {
                path.extend(aggs.keys().next().cloned());
                current = None;
            }
        }
    }
    path
}
