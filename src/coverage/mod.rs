//! Coverage engine: per-category metrics and fixed threshold gates.
//!
//! Everything here is a pure function over immutable snapshots of the
//! surface collection, the bean manifest, and the file inventory.
mod gates;
mod report;

use crate::inventory::FileInventory;
use crate::surface::{SurfaceCategory, SurfaceCollection, SurfaceRef};
use crate::writer::WrittenArtifact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use gates::{evaluate_thresholds, CoverageGate, Evaluation, GateId};
pub use report::{
    coverage_report, render_coverage_markdown, write_coverage_reports, CategoryCoverage,
    CoverageReport, COVERAGE_REPORT_SCHEMA_VERSION,
};

/// Total and covered counts for one category.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricPair {
    pub total: usize,
    pub covered: usize,
}

impl MetricPair {
    pub fn new(total: usize, covered: usize) -> Self {
        Self { total, covered }
    }

    /// Covered share in percent; a category with nothing to document is 100%.
    ///
    /// Not clamped: `covered > total` yields more than 100.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.covered as f64 / self.total as f64 * 100.0
    }
}

/// One metric pair per coverage category.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metrics {
    pub files: MetricPair,
    pub routes: MetricPair,
    pub apis: MetricPair,
    pub models: MetricPair,
    pub components: MetricPair,
    pub config_required: MetricPair,
    pub config_optional: MetricPair,
    pub auth: MetricPair,
    pub middleware: MetricPair,
    pub integrations: MetricPair,
    pub jobs: MetricPair,
    pub ui_flows: MetricPair,
}

/// Count totals and documented surfaces for every category.
pub fn compute_metrics(
    surfaces: &SurfaceCollection,
    artifacts: &[WrittenArtifact],
    inventory: &FileInventory,
) -> Metrics {
    let documented: BTreeSet<(SurfaceCategory, &str)> = artifacts
        .iter()
        .filter(|artifact| !artifact.skipped)
        .map(|artifact| (artifact.category, artifact.title.as_str()))
        .collect();
    let (required, optional): (Vec<_>, Vec<_>) =
        surfaces.config.iter().partition(|config| config.required);
    let required: Vec<_> = required.into_iter().map(SurfaceRef::Config).collect();
    let optional: Vec<_> = optional.into_iter().map(SurfaceRef::Config).collect();
    let category =
        |category: SurfaceCategory| metric_for(&surfaces.in_category(category), &documented);

    Metrics {
        files: MetricPair::new(inventory.total(), inventory.scanned),
        routes: category(SurfaceCategory::Route),
        apis: category(SurfaceCategory::Api),
        models: category(SurfaceCategory::Model),
        components: category(SurfaceCategory::Component),
        config_required: metric_for(&required, &documented),
        config_optional: metric_for(&optional, &documented),
        auth: category(SurfaceCategory::Auth),
        middleware: category(SurfaceCategory::Middleware),
        integrations: category(SurfaceCategory::Integration),
        jobs: category(SurfaceCategory::Job),
        ui_flows: category(SurfaceCategory::UiFlow),
    }
}

fn metric_for<'a>(
    members: &[SurfaceRef<'a>],
    documented: &BTreeSet<(SurfaceCategory, &'a str)>,
) -> MetricPair {
    let covered: BTreeSet<&str> = members
        .iter()
        .filter(|surface| documented.contains(&(surface.category(), surface.name())))
        .map(|surface| surface.name())
        .collect();
    MetricPair::new(members.len(), covered.len())
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
