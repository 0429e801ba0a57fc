//! Gap analyzer: cross-reference queries between facts and beans.
//!
//! Each query is independent. A query that fails (for example because a
//! bean file was deleted) is logged and left out of the report; the rest
//! of the battery still runs.
mod queries;
mod report;

use crate::paths::RunPaths;
use crate::surface::{SurfaceCategory, SurfaceCollection};
use crate::writer::WrittenArtifact;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use queries::{
    find_apis_without_schema, find_beans_missing_sections, find_config_without_bean,
    find_dangling_auth_targets, find_routes_without_bean, find_surfaces_without_bean,
    find_unresolved_schema_refs,
};
pub use report::{render_gap_markdown, write_gap_reports, GAP_REPORT_SCHEMA_VERSION};

/// One discovered inconsistency.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GapEntry {
    pub category: String,
    pub description: String,
    pub file: String,
    pub recommendation: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct GapReport {
    pub total_gaps: usize,
    pub entries: Vec<GapEntry>,
}

impl GapReport {
    pub fn new(entries: Vec<GapEntry>) -> Self {
        Self {
            total_gaps: entries.len(),
            entries,
        }
    }
}

/// The fixed battery, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapQuery {
    Undocumented(SurfaceCategory),
    MissingSections,
    ApisWithoutSchema,
    UnresolvedSchemaRefs,
    DanglingAuthTargets,
}

impl GapQuery {
    pub fn battery() -> Vec<GapQuery> {
        let mut battery: Vec<GapQuery> = SurfaceCategory::ALL
            .into_iter()
            .map(GapQuery::Undocumented)
            .collect();
        battery.extend([
            GapQuery::MissingSections,
            GapQuery::ApisWithoutSchema,
            GapQuery::UnresolvedSchemaRefs,
            GapQuery::DanglingAuthTargets,
        ]);
        battery
    }

    pub fn run(
        &self,
        surfaces: &SurfaceCollection,
        artifacts: &[WrittenArtifact],
        paths: &RunPaths,
    ) -> Result<Vec<GapEntry>> {
        match self {
            GapQuery::Undocumented(category) => {
                Ok(find_surfaces_without_bean(surfaces, artifacts, *category))
            }
            GapQuery::MissingSections => find_beans_missing_sections(artifacts, paths),
            GapQuery::ApisWithoutSchema => Ok(find_apis_without_schema(surfaces)),
            GapQuery::UnresolvedSchemaRefs => Ok(find_unresolved_schema_refs(surfaces, artifacts)),
            GapQuery::DanglingAuthTargets => Ok(find_dangling_auth_targets(surfaces)),
        }
    }
}

impl fmt::Display for GapQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapQuery::Undocumented(category) => write!(f, "undocumented_{category}"),
            GapQuery::MissingSections => f.write_str("missing_sections"),
            GapQuery::ApisWithoutSchema => f.write_str("apis_without_schema"),
            GapQuery::UnresolvedSchemaRefs => f.write_str("unresolved_schema_refs"),
            GapQuery::DanglingAuthTargets => f.write_str("dangling_auth_targets"),
        }
    }
}

/// Run every query in order and concatenate the results.
pub fn run_all_gap_queries(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
    paths: &RunPaths,
) -> GapReport {
    let mut entries = Vec::new();
    for query in GapQuery::battery() {
        match query.run(surfaces, artifacts, paths) {
            Ok(found) => {
                tracing::debug!(query = %query, gaps = found.len(), "gap query finished");
                entries.extend(found);
            }
            Err(err) => {
                tracing::warn!(
                    query = %query,
                    error = %format!("{err:#}"),
                    "gap query failed; omitting its results"
                );
            }
        }
    }
    GapReport::new(entries)
}
