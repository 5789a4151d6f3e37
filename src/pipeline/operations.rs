//! Inbound operations.
//!
//! Each operation validates its arguments, compiles one request, awaits one
//! store round trip and shapes the response:
//! 1. Identifier validation (no store call on failure)
//! 2. Filter composition
//! 3. Query building
//! 4. Search
//! 5. Flattening or report formatting
//! 6. Derived views (projects, subsystems, components)

use crate::error::Result;
use crate::extraction::flatten::flatten;
use crate::extraction::report::format_report;
use crate::logging::structured::LogContext;
use crate::projection::distinct::{distinct_components, distinct_projects, distinct_subsystems};
use crate::storage::filters::{compose, Filter};
use crate::storage::models::{
    BuildRecord, ComponentRef, Dimension, ProjectRef, ReportSummary, SubsystemRef,
};
use crate::storage::queries::{
    aggregation_path, build_latest_query, build_weekly_report_query, ACTION_FIELD,
    LATEST_BUILD_FIELDS,
};
use crate::validation::arguments::{validate_identifier, validate_optional};
use crate::{log_debug, log_info, log_warn};

use super::context::QueryContext;

/// Distinct projects in the current latest-build snapshot.
pub async fn get_projects(ctx: &QueryContext<'_>) -> Result<Vec<ProjectRef>> {
    let log_ctx = ctx.log_context("projects");
    let builds = latest_builds(ctx, &log_ctx, &[]).await?;
    Ok(distinct_projects(&builds))
}

/// Distinct (project, subsystem) pairs in the current snapshot.
pub async fn get_subsystems(ctx: &QueryContext<'_>) -> Result<Vec<SubsystemRef>> {
    let log_ctx = ctx.log_context("subsystems");
    let builds = latest_builds(ctx, &log_ctx, &[]).await?;
    Ok(distinct_subsystems(&builds))
}

/// Distinct (project, subsystem, component) triples in the current snapshot.
pub async fn get_components(ctx: &QueryContext<'_>) -> Result<Vec<ComponentRef>> {
    let log_ctx = ctx.log_context("components");
    let builds = latest_builds(ctx, &log_ctx, &[]).await?;
    Ok(distinct_components(&builds))
}

/// Latest build per (project, subsystem, component, environment),
/// optionally restricted to one project.
pub async fn get_latest_builds(
    ctx: &QueryContext<'_>,
    project: Option<&str>,
) -> Result<Vec<BuildRecord>> {
    let log_ctx = ctx.log_context("latest_builds");
    let project = validate_optional("project", project)?;

    let filters = match project {
        Some(project) => compose(&[(Dimension::Project.keyword_field(), project)]),
        None => Vec::new(),
    };
    latest_builds(ctx, &log_ctx, &filters).await
}

/// Last seven days of pass/fail/total per environment for a project.
pub async fn get_weekly_report_by_project(
    ctx: &QueryContext<'_>,
    project: &str,
    action: &str,
) -> Result<ReportSummary> {
    let log_ctx = ctx.log_context("weekly_report_by_project");
    let pairs = [
        (
            Dimension::Project.keyword_field(),
            validate_identifier("project", project)?,
        ),
        (ACTION_FIELD, validate_identifier("action", action)?),
    ];
    report(ctx, &log_ctx, &pairs, true).await
}

/// Last seven days of pass/fail/total per environment for a subsystem.
pub async fn get_weekly_report_by_subsystem(
    ctx: &QueryContext<'_>,
    project: &str,
    subsystem: &str,
    action: &str,
) -> Result<ReportSummary> {
    let log_ctx = ctx.log_context("weekly_report_by_subsystem");
    let pairs = [
        (
            Dimension::Project.keyword_field(),
            validate_identifier("project", project)?,
        ),
        (
            Dimension::Subsystem.keyword_field(),
            validate_identifier("subsystem", subsystem)?,
        ),
        (ACTION_FIELD, validate_identifier("action", action)?),
    ];
    report(ctx, &log_ctx, &pairs, true).await
}

/// Last seven days of pass/fail/total per environment for a component.
pub async fn get_weekly_report_by_component(
    ctx: &QueryContext<'_>,
    project: &str,
    subsystem: &str,
    component: &str,
    action: &str,
) -> Result<ReportSummary> {
    let log_ctx = ctx.log_context("weekly_report_by_component");
    let pairs = [
        (
            Dimension::Project.keyword_field(),
            validate_identifier("project", project)?,
        ),
        (
            Dimension::Subsystem.keyword_field(),
            validate_identifier("subsystem", subsystem)?,
        ),
        (
            Dimension::Component.keyword_field(),
            validate_identifier("component", component)?,
        ),
        (ACTION_FIELD, validate_identifier("action", action)?),
    ];
    report(ctx, &log_ctx, &pairs, true).await
}

/// Subsystem report without the date-window query filter.
///
/// Every environment that ever saw the action is listed; the day series
/// still cover the last seven days.
pub async fn get_report_by_subsystem(
    ctx: &QueryContext<'_>,
    project: &str,
    subsystem: &str,
    action: &str,
) -> Result<ReportSummary> {
    let log_ctx = ctx.log_context("report_by_subsystem");
    let pairs = [
        (
            Dimension::Project.keyword_field(),
            validate_identifier("project", project)?,
        ),
        (
            Dimension::Subsystem.keyword_field(),
            validate_identifier("subsystem", subsystem)?,
        ),
        (ACTION_FIELD, validate_identifier("action", action)?),
    ];
    report(ctx, &log_ctx, &pairs, false).await
}

async fn latest_builds(
    ctx: &QueryContext<'_>,
    log_ctx: &LogContext,
    filters: &[Filter],
) -> Result<Vec<BuildRecord>> {
    let dimensions = Dimension::HIERARCHY;
    let log_ctx = log_ctx.clone().with_depth(dimensions.len());
    let request = build_latest_query(ctx.config, &dimensions, filters, &LATEST_BUILD_FIELDS)?;

    log_debug!(
        log_ctx,
        "QUERY_START",
        filters = filters.len(),
        aggs = aggregation_path(&request.body)
    );

    let response = ctx.client.search(&request).await.map_err(|e| {
        log_warn!(log_ctx, "QUERY_FAILED", error = e.to_string());
        e
    })?;
    let builds = flatten(&response, &dimensions)?;

    log_info!(log_ctx, "QUERY_COMPLETE", records = builds.len());
    Ok(builds)
}

async fn report(
    ctx: &QueryContext<'_>,
    log_ctx: &LogContext,
    pairs: &[(&str, &str)],
    windowed: bool,
) -> Result<ReportSummary> {
    let window = ctx.window();
    let mut filters = compose(pairs);
    if windowed {
        filters.push(window.filter());
    }
    let request = build_weekly_report_query(ctx.config, &filters, &window);

    log_debug!(
        log_ctx,
        "QUERY_START",
        filters = filters.len(),
        from = window.from,
        to = window.to
    );

    let response = ctx.client.search(&request).await.map_err(|e| {
        log_warn!(log_ctx, "QUERY_FAILED", error = e.to_string());
        e
    })?;
    let summary = format_report(&response)?;

    log_info!(
        log_ctx,
        "QUERY_COMPLETE",
        environments = summary.reports.len(),
        total_pass = summary.total_pass,
        total_fail = summary.total_fail
    );
    Ok(summary)
}
