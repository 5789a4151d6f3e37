//! In-memory document store for integration tests.
//!
//! Evaluates the subset of the search DSL the query builders emit: `bool`,
//! `term`, `terms` and day-rounded `range` queries; `terms`, `filter`,
//! `top_hits`, `date_histogram` and `sum_bucket` aggregations. Bucket order
//! follows the store defaults (document count descending, then key).

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Map, Value};

use buildlens_core::error::Result;
use buildlens_core::storage::{SearchClient, SearchRequest};

type Doc = (String, Value);

#[derive(Default)]
pub struct MemoryStore {
    docs: Vec<Doc>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, source: Value) {
        self.docs.push((id.to_string(), source));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Evaluate a request body against the stored documents.
    pub fn evaluate(&self, body: &Value) -> Value {
        let matching: Vec<&Doc> = self
            .docs
            .iter()
            .filter(|(_, source)| body.get("query").map_or(true, |q| matches(q, source)))
            .collect();

        let aggregations = body
            .get("aggs")
            .and_then(Value::as_object)
            .map(|aggs| eval_aggs(aggs, &matching))
            .unwrap_or_else(|| json!({}));

        json!({
            "took": 1,
            "timed_out": false,
            "hits": {"total": {"value": matching.len(), "relation": "eq"}, "hits": []},
            "aggregations": aggregations,
        })
    }
}

#[async_trait]
impl SearchClient for MemoryStore {
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.evaluate(&request.body))
    }
}

/// Fixed wall clock shared by document timestamps and query windows.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

/// A build-event document timestamped `days_ago` days before [`now`].
pub fn build_doc(
    project: &str,
    subsystem: &str,
    component: &str,
    environment: &str,
    action: &str,
    status: &str,
    days_ago: i64,
) -> Value {
    json!({
        "project": project,
        "subsystem": subsystem,
        "component": component,
        "environment": environment,
        "action": action,
        "status": status,
        "buildVersion": "1.0.10",
        "buildUrl": format!("http://jenkins.local/{}/{}", component, environment),
        "buildId": 100 + days_ago,
        "commits": [{"author": "Nathan", "message": "Initial Commit"}],
        "tickets": ["NGC-8072"],
        "gitRemote": format!("git@git.local:{}.git", component),
        "@timestamp": days_ago_rfc3339(days_ago),
    })
}

pub fn days_ago_rfc3339(days: i64) -> String {
    (now() - Duration::days(days)).to_rfc3339()
}

fn field<'a>(source: &'a Value, name: &str) -> Option<&'a Value> {
    source.get(name.trim_end_matches(".keyword"))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn timestamp(source: &Value) -> Option<DateTime<Utc>> {
    field(source, "@timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_day(bound: &Value) -> NaiveDate {
    let text = bound.as_str().expect("date bound");
    let day = text.split("||").next().unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").expect("yyyy-MM-dd bound")
}

fn matches(clause: &Value, source: &Value) -> bool {
    let (kind, def) = clause
        .as_object()
        .and_then(|o| o.iter().next())
        .expect("single-key query clause");
    match kind.as_str() {
        "bool" => def
            .get("filter")
            .and_then(Value::as_array)
            .map_or(true, |all| all.iter().all(|c| matches(c, source))),
        "term" => {
            let (name, expected) = def.as_object().unwrap().iter().next().unwrap();
            field(source, name).map_or(false, |v| as_text(v) == as_text(expected))
        }
        "terms" => {
            let (name, options) = def.as_object().unwrap().iter().next().unwrap();
            let options = options.as_array().unwrap();
            field(source, name).map_or(false, |v| options.iter().any(|o| as_text(o) == as_text(v)))
        }
        "range" => {
            let (_, bounds) = def.as_object().unwrap().iter().next().unwrap();
            let Some(ts) = timestamp(source) else {
                return false;
            };
            let day = ts.date_naive();
            bounds.get("gte").map_or(true, |b| day >= parse_day(b))
                && bounds.get("lte").map_or(true, |b| day <= parse_day(b))
        }
        other => panic!("unsupported query clause: {}", other),
    }
}

fn eval_aggs(aggs: &Map<String, Value>, docs: &[&Doc]) -> Value {
    let mut out = Map::new();
    for (name, def) in aggs {
        if def.get("sum_bucket").is_none() {
            out.insert(name.clone(), eval_agg(def, docs));
        }
    }
    for (name, def) in aggs {
        if let Some(sum) = def.get("sum_bucket") {
            let path = sum["buckets_path"].as_str().expect("buckets_path");
            let value = sum_bucket(path, &out);
            out.insert(name.clone(), json!({ "value": value }));
        }
    }
    Value::Object(out)
}

fn with_sub_aggs(def: &Value, mut base: Map<String, Value>, docs: &[&Doc]) -> Value {
    if let Some(sub) = def.get("aggs").and_then(Value::as_object) {
        if let Value::Object(results) = eval_aggs(sub, docs) {
            base.extend(results);
        }
    }
    Value::Object(base)
}

fn eval_agg(def: &Value, docs: &[&Doc]) -> Value {
    if let Some(terms) = def.get("terms") {
        return eval_terms(def, terms, docs);
    }
    if let Some(filter) = def.get("filter") {
        let kept: Vec<&Doc> = docs
            .iter()
            .copied()
            .filter(|(_, source)| matches(filter, source))
            .collect();
        let mut base = Map::new();
        base.insert("doc_count".to_string(), json!(kept.len()));
        return with_sub_aggs(def, base, &kept);
    }
    if let Some(top) = def.get("top_hits") {
        return eval_top_hits(top, docs);
    }
    if let Some(histogram) = def.get("date_histogram") {
        return eval_date_histogram(histogram, docs);
    }
    panic!("unsupported aggregation: {}", def);
}

fn eval_terms(def: &Value, terms: &Value, docs: &[&Doc]) -> Value {
    let name = terms["field"].as_str().expect("terms field");
    let size = terms.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

    let mut groups: Vec<(String, Vec<&Doc>)> = Vec::new();
    for doc in docs {
        let Some(key) = field(&doc.1, name).map(as_text) else {
            continue;
        };
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(*doc),
            None => groups.push((key, vec![*doc])),
        }
    }
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    let other: usize = groups.iter().skip(size).map(|(_, m)| m.len()).sum();
    let buckets: Vec<Value> = groups
        .iter()
        .take(size)
        .map(|(key, members)| {
            let mut base = Map::new();
            base.insert("key".to_string(), json!(key));
            base.insert("doc_count".to_string(), json!(members.len()));
            with_sub_aggs(def, base, members)
        })
        .collect();

    json!({
        "doc_count_error_upper_bound": 0,
        "sum_other_doc_count": other,
        "buckets": buckets,
    })
}

fn eval_top_hits(top: &Value, docs: &[&Doc]) -> Value {
    let size = top.get("size").and_then(Value::as_u64).unwrap_or(3) as usize;
    let includes: Option<Vec<&str>> = top
        .pointer("/_source/includes")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect());

    let mut sorted: Vec<&Doc> = docs.to_vec();
    sorted.sort_by(|a, b| timestamp(&b.1).cmp(&timestamp(&a.1)));

    let hits: Vec<Value> = sorted
        .iter()
        .take(size)
        .map(|(id, source)| {
            let projected = match (&includes, source) {
                (Some(fields), Value::Object(obj)) => Value::Object(
                    obj.iter()
                        .filter(|(k, _)| fields.contains(&k.as_str()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
                _ => source.clone(),
            };
            json!({"_index": "ngcc-test", "_id": id, "_score": null, "_source": projected})
        })
        .collect();

    json!({
        "hits": {
            "total": {"value": docs.len(), "relation": "eq"},
            "max_score": null,
            "hits": hits,
        }
    })
}

fn eval_date_histogram(histogram: &Value, docs: &[&Doc]) -> Value {
    let days: Vec<NaiveDate> = docs
        .iter()
        .filter_map(|(_, source)| timestamp(source))
        .map(|ts| ts.date_naive())
        .collect();

    let hard = histogram.get("hard_bounds");
    let extended = histogram.get("extended_bounds");

    let mut start = days.iter().min().copied();
    let mut end = days.iter().max().copied();
    if let Some(bounds) = extended {
        let (min, max) = (parse_day(&bounds["min"]), parse_day(&bounds["max"]));
        start = Some(start.map_or(min, |s| s.min(min)));
        end = Some(end.map_or(max, |e| e.max(max)));
    }
    if let Some(bounds) = hard {
        let (min, max) = (parse_day(&bounds["min"]), parse_day(&bounds["max"]));
        start = start.map(|s| s.max(min));
        end = end.map(|e| e.min(max));
    }

    let mut buckets = Vec::new();
    if let (Some(start), Some(end)) = (start, end) {
        for day in start.iter_days().take_while(|d| *d <= end) {
            let count = days.iter().filter(|d| **d == day).count();
            let millis = day
                .and_hms_opt(0, 0, 0)
                .expect("midnight")
                .and_utc()
                .timestamp_millis();
            buckets.push(json!({
                "key_as_string": day.format("%Y-%m-%d").to_string(),
                "key": millis,
                "doc_count": count,
            }));
        }
    }

    json!({ "buckets": buckets })
}

fn sum_bucket(path: &str, siblings: &Map<String, Value>) -> f64 {
    let segments: Vec<&str> = path.split('>').collect();
    let buckets = siblings[segments[0]]["buckets"]
        .as_array()
        .expect("sum_bucket path must start at a multi-bucket aggregation");

    buckets
        .iter()
        .map(|bucket| {
            let mut node = bucket;
            for segment in &segments[1..segments.len() - 1] {
                node = &node[*segment];
            }
            match segments[segments.len() - 1] {
                "_count" => node["doc_count"].as_f64().unwrap_or(0.0),
                metric => node[metric]["value"].as_f64().unwrap_or(0.0),
            }
        })
        .sum()
}
