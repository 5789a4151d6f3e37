//! Distinct-by-key projections.
//!
//! Each view keeps the first occurrence of every key, in input order. Views
//! are recomputed from whatever snapshot they are given.

use std::collections::HashSet;
use std::hash::Hash;

use crate::storage::models::{BuildRecord, ComponentRef, ProjectRef, SubsystemRef};

/// Project every record and keep first occurrences only.
pub fn distinct_by<T, K, F>(items: &[T], project: F) -> Vec<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .map(project)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

pub fn distinct_projects(builds: &[BuildRecord]) -> Vec<ProjectRef> {
    distinct_by(builds, |b| ProjectRef {
        project: b.project.clone(),
    })
}

pub fn distinct_subsystems(builds: &[BuildRecord]) -> Vec<SubsystemRef> {
    distinct_by(builds, |b| SubsystemRef {
        project: b.project.clone(),
        subsystem: b.subsystem.clone(),
    })
}

pub fn distinct_components(builds: &[BuildRecord]) -> Vec<ComponentRef> {
    distinct_by(builds, |b| ComponentRef {
        project: b.project.clone(),
        subsystem: b.subsystem.clone(),
        component: b.component.clone(),
    })
}
