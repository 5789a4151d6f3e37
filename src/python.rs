//! Python bindings.
//!
//! The host process owns the store connection: it asks this module for a
//! compiled request, executes it, and hands the raw response back for
//! flattening or report formatting. Everything crosses the boundary as JSON
//! strings.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::StoreConfig;
use crate::error::Error;
use crate::extraction::{flatten, format_report};
use crate::log_info;
use crate::logging::init_logger;
use crate::projection::distinct;
use crate::storage::filters::{compose, WeekWindow};
use crate::storage::models::{BuildRecord, Dimension};
use crate::storage::queries::{
    build_latest_query, build_weekly_report_query, ACTION_FIELD, LATEST_BUILD_FIELDS,
};
use crate::validation::arguments::{validate_identifier, validate_optional};

fn to_py_err(e: Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| to_py_err(e.into()))
}

fn parse_builds(builds: &str) -> PyResult<Vec<BuildRecord>> {
    serde_json::from_str(builds).map_err(|e| to_py_err(e.into()))
}

/// Compile the latest-build request, optionally filtered by project.
///
/// # Returns
/// JSON object `{"index": ..., "body": ...}`
#[pyfunction]
#[pyo3(signature = (project=None))]
fn build_latest_builds_query(project: Option<String>) -> PyResult<String> {
    init_logger();
    let config = StoreConfig::from_env();
    let project = validate_optional("project", project.as_deref()).map_err(to_py_err)?;

    let filters = match project {
        Some(project) => compose(&[(Dimension::Project.keyword_field(), project)]),
        None => Vec::new(),
    };
    let request = build_latest_query(&config, &Dimension::HIERARCHY, &filters, &LATEST_BUILD_FIELDS)
        .map_err(to_py_err)?;
    to_json(&request)
}

/// Compile a report request for a project, subsystem or component.
///
/// # Arguments
/// * `windowed` - Restrict matching documents to the last seven days
#[pyfunction]
#[pyo3(signature = (project, action, subsystem=None, component=None, windowed=true))]
fn build_report_query(
    project: String,
    action: String,
    subsystem: Option<String>,
    component: Option<String>,
    windowed: bool,
) -> PyResult<String> {
    init_logger();
    let config = StoreConfig::from_env();

    let mut pairs = vec![(
        Dimension::Project.keyword_field(),
        validate_identifier("project", &project).map_err(to_py_err)?,
    )];
    if let Some(subsystem) = validate_optional("subsystem", subsystem.as_deref()).map_err(to_py_err)? {
        pairs.push((Dimension::Subsystem.keyword_field(), subsystem));
    }
    if let Some(component) = validate_optional("component", component.as_deref()).map_err(to_py_err)? {
        pairs.push((Dimension::Component.keyword_field(), component));
    }
    pairs.push((
        ACTION_FIELD,
        validate_identifier("action", &action).map_err(to_py_err)?,
    ));

    let window = WeekWindow::current();
    let mut filters = compose(&pairs);
    if windowed {
        filters.push(window.filter());
    }
    to_json(&build_weekly_report_query(&config, &filters, &window))
}

/// Flatten a latest-build response into a JSON array of builds.
#[pyfunction]
fn flatten_latest_builds(response: String) -> PyResult<String> {
    let response: serde_json::Value =
        serde_json::from_str(&response).map_err(|e| to_py_err(e.into()))?;
    let builds = flatten(&response, &Dimension::HIERARCHY).map_err(to_py_err)?;
    log_info!("PY_FLATTEN_COMPLETE", records = builds.len());
    to_json(&builds)
}

/// Format a report response into a JSON report summary.
#[pyfunction]
fn format_report_response(response: String) -> PyResult<String> {
    let response: serde_json::Value =
        serde_json::from_str(&response).map_err(|e| to_py_err(e.into()))?;
    to_json(&format_report(&response).map_err(to_py_err)?)
}

#[pyfunction]
fn distinct_projects(builds: String) -> PyResult<String> {
    to_json(&distinct::distinct_projects(&parse_builds(&builds)?))
}

#[pyfunction]
fn distinct_subsystems(builds: String) -> PyResult<String> {
    to_json(&distinct::distinct_subsystems(&parse_builds(&builds)?))
}

#[pyfunction]
fn distinct_components(builds: String) -> PyResult<String> {
    to_json(&distinct::distinct_components(&parse_builds(&builds)?))
}

/// Python module definition
#[pymodule]
fn buildlens_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_latest_builds_query, m)?)?;
    m.add_function(wrap_pyfunction!(build_report_query, m)?)?;
    m.add_function(wrap_pyfunction!(flatten_latest_builds, m)?)?;
    m.add_function(wrap_pyfunction!(format_report_response, m)?)?;
    m.add_function(wrap_pyfunction!(distinct_projects, m)?)?;
    m.add_function(wrap_pyfunction!(distinct_subsystems, m)?)?;
    m.add_function(wrap_pyfunction!(distinct_components, m)?)?;
    Ok(())
}
