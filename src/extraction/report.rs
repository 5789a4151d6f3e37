//! Weekly report formatting.
//!
//! Reads the per-environment pass/fail/total day series and the three
//! cross-environment sums out of a report response.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::extraction::json_path::{bucket_key, buckets, doc_count, resolve_path, value_to_u64};
use crate::log_debug;
use crate::storage::models::{DayCount, Dimension, EnvironmentReport, ReportSummary};
use crate::storage::queries::{
    DAY_AGG, FAIL_AGG, PASS_AGG, TOTAL_AGG, TOTAL_FAIL_AGG, TOTAL_PASS_AGG,
    TOTAL_PASS_AND_FAIL_AGG,
};

/// Format a report response into a [`ReportSummary`].
///
/// Day ordering and zero-filled days come from the store as-is.
pub fn format_report(response: &Value) -> Result<ReportSummary> {
    let env_agg = Dimension::Environment.agg_name();

    let aggregations = response
        .get("aggregations")
        .ok_or_else(|| Error::MalformedResponse("response has no aggregations".to_string()))?;

    let environments = buckets(aggregations, env_agg).ok_or_else(|| {
        Error::MalformedResponse(format!("response has no '{}' aggregation", env_agg))
    })?;

    let reports = environments
        .iter()
        .map(|bucket| {
            let environment = bucket_key(bucket).ok_or_else(|| {
                Error::MalformedResponse(format!("bucket without key in '{}'", env_agg))
            })?;
            Ok(EnvironmentReport {
                environment,
                pass: day_series(bucket, PASS_AGG),
                fail: day_series(bucket, FAIL_AGG),
                total: day_series(bucket, TOTAL_AGG),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportSummary {
        reports,
        total_pass: sum_value(aggregations, TOTAL_PASS_AGG),
        total_fail: sum_value(aggregations, TOTAL_FAIL_AGG),
        total_pass_and_fail: sum_value(aggregations, TOTAL_PASS_AND_FAIL_AGG),
    })
}

/// Day buckets of one status class; a missing class is an empty series.
fn day_series(env_bucket: &Value, status_agg: &str) -> Vec<DayCount> {
    let days = match env_bucket.get(status_agg).and_then(|s| buckets(s, DAY_AGG)) {
        Some(days) => days,
        None => {
            log_debug!("REPORT_SERIES_MISSING", agg = status_agg);
            return Vec::new();
        }
    };

    days.iter()
        .map(|day| DayCount {
            day: day_key(day),
            count: doc_count(day),
        })
        .collect()
}

/// Formatted day key, falling back to the epoch-millis key.
fn day_key(day: &Value) -> String {
    if let Some(formatted) = day.get("key_as_string").and_then(Value::as_str) {
        return formatted.to_string();
    }
    day.get("key")
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .or_else(|| bucket_key(day))
        .unwrap_or_default()
}

fn sum_value(aggregations: &Value, agg_name: &str) -> u64 {
    resolve_path(aggregations, &[agg_name, "value"])
        .and_then(value_to_u64)
        .unwrap_or(0)
}
