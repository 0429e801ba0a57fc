use super::{GapEntry, GapReport};
use crate::paths::RunPaths;
use crate::util::{write_json, write_text};
use anyhow::Result;
use serde::Serialize;

/// Current schema version for `gaps.json`.
pub const GAP_REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct GapReportFile<'a> {
    schema_version: u32,
    total_gaps: usize,
    entries: &'a [GapEntry],
}

/// Render gaps grouped by category, in first-appearance order.
pub fn render_gap_markdown(report: &GapReport) -> String {
    let mut out = String::new();
    out.push_str("# Gap Report\n\n");
    out.push_str(&format!("Total gaps: {}\n", report.total_gaps));
    if report.entries.is_empty() {
        out.push_str("\nNo gaps found.\n");
        return out;
    }

    let mut groups: Vec<(&str, Vec<&GapEntry>)> = Vec::new();
    for entry in &report.entries {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == entry.category)
        {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.category.as_str(), vec![entry])),
        }
    }

    for (category, members) in groups {
        out.push_str(&format!("\n## {category} ({})\n\n", members.len()));
        for entry in members {
            out.push_str(&format!("- {}\n", entry.description));
            out.push_str(&format!("  - File: `{}`\n", entry.file));
            out.push_str(&format!("  - Action: {}\n", entry.recommendation));
        }
    }
    out
}

/// Write `gaps.md` and `gaps.json` into the run root.
pub fn write_gap_reports(paths: &RunPaths, report: &GapReport) -> Result<()> {
    write_text(&paths.gaps_markdown_path(), &render_gap_markdown(report))?;
    write_json(
        &paths.gaps_json_path(),
        &GapReportFile {
            schema_version: GAP_REPORT_SCHEMA_VERSION,
            total_gaps: report.total_gaps,
            entries: &report.entries,
        },
    )?;
    Ok(())
}
