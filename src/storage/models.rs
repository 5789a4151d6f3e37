//! Build and report models.
//!
//! These models represent build-event documents as surfaced by aggregation
//! responses, plus the report and projection shapes derived from them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::extraction::json_path::value_to_string;

/// Grouping dimensions of the build hierarchy, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Project,
    Subsystem,
    Component,
    Environment,
}

impl Dimension {
    /// Full hierarchy used by the latest-build query.
    pub const HIERARCHY: [Dimension; 4] = [
        Dimension::Project,
        Dimension::Subsystem,
        Dimension::Component,
        Dimension::Environment,
    ];

    /// Document field holding this dimension.
    pub fn field(&self) -> &'static str {
        match self {
            Dimension::Project => "project",
            Dimension::Subsystem => "subsystem",
            Dimension::Component => "component",
            Dimension::Environment => "environment",
        }
    }

    /// Exact-match (keyword) field used for term filters and bucketing.
    pub fn keyword_field(&self) -> &'static str {
        match self {
            Dimension::Project => "project.keyword",
            Dimension::Subsystem => "subsystem.keyword",
            Dimension::Component => "component.keyword",
            Dimension::Environment => "environment.keyword",
        }
    }

    /// Name of the bucket aggregation grouping by this dimension.
    pub fn agg_name(&self) -> &'static str {
        match self {
            Dimension::Project => "by_project",
            Dimension::Subsystem => "by_subsystem",
            Dimension::Component => "by_component",
            Dimension::Environment => "by_environment",
        }
    }
}

/// A commit carried by a build event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default, deserialize_with = "string_or_number")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub message: Option<String>,
}

/// The most recent build for one (project, subsystem, component, environment).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub subsystem: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub build_version: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub build_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub build_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub build_status: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "commit_list")]
    pub commits: Vec<Commit>,
    #[serde(default, deserialize_with = "string_list")]
    pub tickets: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub git_remote: Option<String>,
    #[serde(default, rename = "@timestamp", deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
}

impl BuildRecord {
    /// Value of a grouping dimension on this record.
    pub fn dimension(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Project => &self.project,
            Dimension::Subsystem => &self.subsystem,
            Dimension::Component => &self.component,
            Dimension::Environment => &self.environment,
        }
    }

    pub fn set_dimension(&mut self, dimension: Dimension, value: String) {
        match dimension {
            Dimension::Project => self.project = value,
            Dimension::Subsystem => self.subsystem = value,
            Dimension::Component => self.component = value,
            Dimension::Environment => self.environment = value,
        }
    }
}

// Producers disagree on scalar types (versions, build ids and tickets arrive
// as strings or numbers), so scalar fields are read leniently.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.is_null())
        .map(|v| value_to_string(&v)))
}

/// Null or a bare scalar reads as a list; null elements are dropped.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        scalar => vec![scalar],
    };
    Ok(items
        .iter()
        .filter(|v| !v.is_null())
        .map(value_to_string)
        .collect())
}

/// Null reads as no commits; entries that are not commit objects are skipped.
fn commit_list<'de, D>(deserializer: D) -> Result<Vec<Commit>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Document count for one day of a report series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

/// Pass/fail/total series for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentReport {
    pub environment: String,
    pub pass: Vec<DayCount>,
    pub fail: Vec<DayCount>,
    pub total: Vec<DayCount>,
}

/// One report result across all environments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub reports: Vec<EnvironmentReport>,
    pub total_pass: u64,
    pub total_fail: u64,
    pub total_pass_and_fail: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectRef {
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsystemRef {
    pub project: String,
    pub subsystem: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    pub project: String,
    pub subsystem: String,
    pub component: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_record_from_source() {
        let source = json!({
            "project": "NGCC",
            "subsystem": "Cosmos",
            "component": "NGCC",
            "environment": "Pre-Merge",
            "buildVersion": "1.0.10",
            "buildUrl": "http://jenkins/job/1",
            "buildId": 42,
            "action": "Build",
            "status": "SUCCESS",
            "commits": [{"author": "Nathan", "message": "Initial Commit"}],
            "tickets": ["NGC-8072"],
            "@timestamp": "2026-10-15T10:00:00Z"
        });

        let record: BuildRecord = serde_json::from_value(source).unwrap();
        assert_eq!(record.build_id.as_deref(), Some("42"));
        assert_eq!(record.build_version.as_deref(), Some("1.0.10"));
        assert_eq!(record.commits.len(), 1);
        assert_eq!(record.tickets, vec!["NGC-8072"]);
        assert_eq!(record.timestamp.as_deref(), Some("2026-10-15T10:00:00Z"));
        assert!(record.git_remote.is_none());
    }

    #[test]
    fn test_build_record_tolerates_loose_types() {
        let source = json!({
            "buildVersion": 2,
            "status": "SUCCESS",
            "commits": null,
            "tickets": [8072, null, "NGC-1"],
            "gitRemote": null
        });

        let record: BuildRecord = serde_json::from_value(source).unwrap();
        assert_eq!(record.build_version.as_deref(), Some("2"));
        assert!(record.commits.is_empty());
        assert_eq!(record.tickets, vec!["8072", "NGC-1"]);
        assert!(record.git_remote.is_none());

        let record: BuildRecord = serde_json::from_value(json!({
            "tickets": null,
            "commits": [{"author": "Nathan", "message": 42}, "bogus"]
        }))
        .unwrap();
        assert!(record.tickets.is_empty());
        assert_eq!(record.commits.len(), 1);
        assert_eq!(record.commits[0].message.as_deref(), Some("42"));
    }

    #[test]
    fn test_build_record_serializes_camel_case() {
        let record = BuildRecord {
            id: "doc-1".to_string(),
            git_remote: Some("git@example:ngcc.git".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["gitRemote"], json!("git@example:ngcc.git"));
        assert_eq!(value["id"], json!("doc-1"));
    }

    #[test]
    fn test_report_summary_field_names() {
        let value = serde_json::to_value(ReportSummary::default()).unwrap();
        assert!(value.get("totalPassAndFail").is_some());
        assert!(value.get("reports").is_some());
    }

    #[test]
    fn test_dimension_names() {
        assert_eq!(Dimension::Environment.agg_name(), "by_environment");
        assert_eq!(Dimension::Project.keyword_field(), "project.keyword");
        let mut record = BuildRecord::default();
        record.set_dimension(Dimension::Component, "NGCC".to_string());
        assert_eq!(record.dimension(Dimension::Component), "NGCC");
    }
}
