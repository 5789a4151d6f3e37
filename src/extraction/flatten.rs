//! Bucket tree flattening.
//!
//! Walks a nested terms-aggregation response one level per grouping
//! dimension and concatenates the top hit of every leaf bucket into a flat
//! list of [`BuildRecord`]s.
//!
//! Records come out depth-first, left-to-right, in the order the store
//! returned its buckets (document count descending unless the request says
//! otherwise). Nothing here re-sorts.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::extraction::json_path::{bucket_key, buckets, resolve_path, value_to_string};
use crate::log_debug;
use crate::storage::models::{BuildRecord, Dimension};
use crate::storage::queries::LATEST_HIT_AGG;

/// Flatten a latest-build response grouped by `dimensions` (outermost first).
///
/// A missing `aggregations` object or a missing outermost aggregation is a
/// fault; a missing nested aggregation is an empty level.
pub fn flatten(response: &Value, dimensions: &[Dimension]) -> Result<Vec<BuildRecord>> {
    let outer = dimensions.first().ok_or_else(|| {
        Error::InvalidArguments("at least one grouping dimension is required".to_string())
    })?;

    let aggregations = response
        .get("aggregations")
        .ok_or_else(|| Error::MalformedResponse("response has no aggregations".to_string()))?;

    let root = buckets(aggregations, outer.agg_name()).ok_or_else(|| {
        Error::MalformedResponse(format!(
            "response has no '{}' aggregation",
            outer.agg_name()
        ))
    })?;

    let mut records = Vec::new();
    let mut keys = Vec::with_capacity(dimensions.len());
    walk(root, dimensions, &mut keys, &mut records)?;
    Ok(records)
}

fn walk(
    level: &[Value],
    dimensions: &[Dimension],
    keys: &mut Vec<(Dimension, String)>,
    out: &mut Vec<BuildRecord>,
) -> Result<()> {
    let Some((dimension, rest)) = dimensions.split_first() else {
        return Ok(());
    };

    for bucket in level {
        let key = bucket_key(bucket).ok_or_else(|| {
            Error::MalformedResponse(format!("bucket without key in '{}'", dimension.agg_name()))
        })?;
        keys.push((*dimension, key));

        match rest.first() {
            Some(next) => match buckets(bucket, next.agg_name()) {
                Some(children) => walk(children, rest, keys, out)?,
                None => log_debug!(
                    "FLATTEN_LEVEL_MISSING",
                    agg = next.agg_name(),
                    parent = keys
                ),
            },
            None => emit_top_hit(bucket, keys, out)?,
        }

        keys.pop();
    }

    Ok(())
}

/// Emit the leaf payload of a bucket, stamped with the bucket keys above it.
fn emit_top_hit(
    bucket: &Value,
    keys: &[(Dimension, String)],
    out: &mut Vec<BuildRecord>,
) -> Result<()> {
    let hits = match resolve_path(bucket, &[LATEST_HIT_AGG, "hits", "hits"]).and_then(Value::as_array)
    {
        Some(hits) => hits,
        None => {
            log_debug!("FLATTEN_NO_HITS", keys = keys);
            return Ok(());
        }
    };

    for hit in hits {
        let source = hit
            .get("_source")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        let mut record: BuildRecord = serde_json::from_value(source)
            .map_err(|e| Error::MalformedResponse(format!("unreadable top hit: {}", e)))?;

        if let Some(id) = hit.get("_id") {
            record.id = value_to_string(id);
        }
        for (dimension, key) in keys {
            record.set_dimension(*dimension, key.clone());
        }
        out.push(record);
    }

    Ok(())
}
