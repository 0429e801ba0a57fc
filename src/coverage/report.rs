//! Coverage report artifacts: `coverage.json` and `coverage.md`.
//!
//! Both renderings are deterministic so reruns produce identical bytes.
use super::gates::round_percentage;
use super::{Evaluation, GateId};
use crate::paths::RunPaths;
use crate::util::{write_json, write_text};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current schema version for `coverage.json`.
pub const COVERAGE_REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CategoryCoverage {
    pub total: usize,
    pub covered: usize,
    pub percentage: f64,
}

/// Machine-readable coverage report.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoverageReport {
    pub schema_version: u32,
    pub all_passed: bool,
    pub categories: BTreeMap<String, CategoryCoverage>,
    pub gates: Vec<super::CoverageGate>,
}

pub fn coverage_report(evaluation: &Evaluation) -> CoverageReport {
    let categories = GateId::ALL
        .iter()
        .map(|gate| {
            let pair = gate.metric(&evaluation.metrics);
            (
                gate.as_str().to_string(),
                CategoryCoverage {
                    total: pair.total,
                    covered: pair.covered,
                    percentage: round_percentage(pair.percentage()),
                },
            )
        })
        .collect();
    CoverageReport {
        schema_version: COVERAGE_REPORT_SCHEMA_VERSION,
        all_passed: evaluation.all_passed,
        categories,
        gates: evaluation.gates.clone(),
    }
}

/// Render the human-readable table with a PASS/FAIL column and banner.
pub fn render_coverage_markdown(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    push_line(&mut out, "# Coverage Report");
    push_line(&mut out, "");
    let banner = if evaluation.all_passed {
        "ALL GATES PASSED".to_string()
    } else {
        format!("{} GATES FAILED", evaluation.failed_count())
    };
    push_line(&mut out, &format!("**{banner}**"));
    push_line(&mut out, "");
    push_line(
        &mut out,
        "| Gate | Covered | Total | Coverage | Threshold | Result |",
    );
    push_line(
        &mut out,
        "|------|--------:|------:|---------:|----------:|--------|",
    );
    for gate in &evaluation.gates {
        push_line(
            &mut out,
            &format!(
                "| {} | {} | {} | {:.4}% | {:.2}% | {} |",
                gate.label,
                gate.covered,
                gate.total,
                gate.percentage,
                gate.threshold,
                if gate.passed { "PASS" } else { "FAIL" }
            ),
        );
    }
    out
}

/// Write both coverage artifacts into the run root.
pub fn write_coverage_reports(paths: &RunPaths, evaluation: &Evaluation) -> Result<()> {
    write_json(&paths.coverage_json_path(), &coverage_report(evaluation))?;
    write_text(
        &paths.coverage_markdown_path(),
        &render_coverage_markdown(evaluation),
    )?;
    Ok(())
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
