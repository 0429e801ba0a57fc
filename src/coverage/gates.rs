//! Fixed coverage gates.
//!
//! The gate set and its thresholds are a contract, not configuration.
use super::{MetricPair, Metrics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named gates, in report order.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GateId {
    Files,
    Routes,
    Apis,
    Models,
    Components,
    ConfigRequired,
    ConfigOptional,
    Auth,
    Middleware,
    Integrations,
    Jobs,
    UiFlows,
}

impl GateId {
    pub const ALL: [GateId; 12] = [
        GateId::Files,
        GateId::Routes,
        GateId::Apis,
        GateId::Models,
        GateId::Components,
        GateId::ConfigRequired,
        GateId::ConfigOptional,
        GateId::Auth,
        GateId::Middleware,
        GateId::Integrations,
        GateId::Jobs,
        GateId::UiFlows,
    ];

    /// Return the stable string identifier used in JSON artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateId::Files => "files",
            GateId::Routes => "routes",
            GateId::Apis => "apis",
            GateId::Models => "models",
            GateId::Components => "components",
            GateId::ConfigRequired => "config_required",
            GateId::ConfigOptional => "config_optional",
            GateId::Auth => "auth",
            GateId::Middleware => "middleware",
            GateId::Integrations => "integrations",
            GateId::Jobs => "jobs",
            GateId::UiFlows => "ui_flows",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateId::Files => "Files",
            GateId::Routes => "Routes",
            GateId::Apis => "APIs",
            GateId::Models => "Models",
            GateId::Components => "Components",
            GateId::ConfigRequired => "Required Config",
            GateId::ConfigOptional => "Optional Config",
            GateId::Auth => "Auth",
            GateId::Middleware => "Middleware",
            GateId::Integrations => "Integrations",
            GateId::Jobs => "Jobs",
            GateId::UiFlows => "UI Flows",
        }
    }

    /// Minimum coverage percentage for the gate to pass.
    pub fn threshold(&self) -> f64 {
        match self {
            GateId::Files => 90.0,
            GateId::Routes => 100.0,
            GateId::Apis => 100.0,
            GateId::Models => 100.0,
            GateId::Components => 95.0,
            GateId::ConfigRequired => 100.0,
            GateId::ConfigOptional => 90.0,
            GateId::Auth => 100.0,
            GateId::Middleware => 95.0,
            GateId::Integrations => 95.0,
            GateId::Jobs => 95.0,
            GateId::UiFlows => 80.0,
        }
    }

    pub fn metric(&self, metrics: &Metrics) -> MetricPair {
        match self {
            GateId::Files => metrics.files,
            GateId::Routes => metrics.routes,
            GateId::Apis => metrics.apis,
            GateId::Models => metrics.models,
            GateId::Components => metrics.components,
            GateId::ConfigRequired => metrics.config_required,
            GateId::ConfigOptional => metrics.config_optional,
            GateId::Auth => metrics.auth,
            GateId::Middleware => metrics.middleware,
            GateId::Integrations => metrics.integrations,
            GateId::Jobs => metrics.jobs,
            GateId::UiFlows => metrics.ui_flows,
        }
    }
}

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one category against its threshold.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoverageGate {
    pub name: GateId,
    pub label: String,
    pub total: usize,
    pub covered: usize,
    /// Percentage rounded to four decimals, as compared.
    pub percentage: f64,
    pub threshold: f64,
    pub passed: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Evaluation {
    pub metrics: Metrics,
    pub gates: Vec<CoverageGate>,
    pub all_passed: bool,
}

impl Evaluation {
    pub fn failed_gates(&self) -> impl Iterator<Item = &CoverageGate> {
        self.gates.iter().filter(|gate| !gate.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.failed_gates().count()
    }
}

/// Check every fixed gate against the computed metrics.
pub fn evaluate_thresholds(metrics: &Metrics) -> Evaluation {
    let gates: Vec<CoverageGate> = GateId::ALL
        .iter()
        .map(|gate| {
            let pair = gate.metric(metrics);
            let percentage = round_percentage(pair.percentage());
            let threshold = gate.threshold();
            CoverageGate {
                name: *gate,
                label: gate.label().to_string(),
                total: pair.total,
                covered: pair.covered,
                percentage,
                threshold,
                passed: percentage >= threshold,
            }
        })
        .collect();
    let all_passed = gates.iter().all(|gate| gate.passed);
    Evaluation {
        metrics: *metrics,
        gates,
        all_passed,
    }
}

/// Round to the nearest 0.0001 so float noise never flips a gate.
pub(crate) fn round_percentage(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
