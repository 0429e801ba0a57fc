//! Command handlers behind the CLI.
use crate::checkpoint::read_checkpoint;
use crate::cli::{InitArgs, RunArgs, StatusArgs};
use crate::config::{load_config, write_config, RunConfig};
use crate::coverage::CoverageReport;
use crate::extract::SnapshotExtractor;
use crate::paths::RunPaths;
use crate::pipeline::{EventKind, Orchestrator, PipelineEvent, PipelineOptions, RunResult};
use crate::stage::Stage;
use crate::util::{display_path, read_json};
use crate::writer::MarkdownBeanWriter;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub fn run_init(args: InitArgs) -> Result<()> {
    fs::create_dir_all(&args.out).with_context(|| format!("create {}", args.out.display()))?;
    let paths = RunPaths::new(args.out.clone());
    let config_path = paths.config_path();
    if config_path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }
    write_config(paths.root(), &RunConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(())
}

pub fn run_pipeline(args: RunArgs) -> Result<()> {
    let out_root = resolve_run_root(args.out.as_deref(), &args.source)?;
    let config = load_config(&out_root)?;
    let options = PipelineOptions {
        source_root: args.source.clone(),
        out_root: out_root.clone(),
        resume: args.resume,
        config,
    };
    let extractor = SnapshotExtractor::new(args.surfaces.clone());
    let writer = MarkdownBeanWriter;
    let show_progress = !args.json;
    let observer = move |event: &PipelineEvent| {
        if show_progress {
            print_event(event);
        }
    };
    let result = Orchestrator::new(options, &extractor, &writer)
        .with_observer(&observer)
        .run();

    if args.json {
        let text = serde_json::to_string_pretty(&result).context("serialize run result")?;
        println!("{text}");
    } else {
        print_result(&out_root, &result);
    }

    if !result.success {
        let stage = result
            .failed_stage
            .map(|stage| stage.to_string())
            .unwrap_or_else(|| "setup".to_string());
        return Err(anyhow!(
            "{stage} failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        ));
    }
    if !result.coverage_passed {
        return Err(anyhow!("coverage gates failed"));
    }
    Ok(())
}

/// Summary of one run root, as printed by `status`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub run_root: String,
    pub completed: Vec<Stage>,
    pub pending: Vec<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_passed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_gates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gaps_found: Option<usize>,
    pub next_action: String,
}

#[derive(Deserialize)]
struct GapTotals {
    total_gaps: usize,
}

pub fn build_status_summary(run_root: &Path) -> Result<StatusSummary> {
    let paths = RunPaths::new(run_root.to_path_buf());
    let checkpoint = read_checkpoint(run_root)?;
    let (completed, pending) = match checkpoint.as_ref() {
        Some(checkpoint) => (checkpoint.completed.clone(), checkpoint.pending.clone()),
        None => (Vec::new(), Stage::ALL.to_vec()),
    };

    // Reports belong to this checkpoint only once its gate stage completed.
    let gate_done = completed.contains(&Stage::Gate);
    let coverage: Option<CoverageReport> = if gate_done && paths.coverage_json_path().is_file() {
        Some(read_json(&paths.coverage_json_path())?)
    } else {
        None
    };
    let gaps: Option<GapTotals> = if gate_done && paths.gaps_json_path().is_file() {
        Some(read_json(&paths.gaps_json_path())?)
    } else {
        None
    };
    let failed_gates = coverage
        .as_ref()
        .map(|report| {
            report
                .gates
                .iter()
                .filter(|gate| !gate.passed)
                .map(|gate| gate.name.to_string())
                .collect()
        })
        .unwrap_or_default();

    let root = run_root.display();
    let next_action = if checkpoint.is_none() {
        format!("beanpack run --source <DIR> --surfaces <FILE> --out {root}")
    } else if let Some(stage) = pending.first() {
        format!(
            "beanpack run --source <DIR> --surfaces <FILE> --out {root} --resume (next: {stage})"
        )
    } else {
        "none; run complete".to_string()
    };

    Ok(StatusSummary {
        run_root: run_root.display().to_string(),
        completed,
        pending,
        coverage_passed: coverage.map(|report| report.all_passed),
        failed_gates,
        gaps_found: gaps.map(|totals| totals.total_gaps),
        next_action,
    })
}

pub fn run_status(args: StatusArgs) -> Result<()> {
    let summary = build_status_summary(&args.out)?;
    if args.json {
        let text = serde_json::to_string_pretty(&summary).context("serialize status summary")?;
        println!("{text}");
        return Ok(());
    }
    println!("run root: {}", summary.run_root);
    println!("completed: {}", stage_list(&summary.completed));
    println!("pending: {}", stage_list(&summary.pending));
    match summary.coverage_passed {
        Some(true) => println!("coverage: all gates passed"),
        Some(false) => println!("coverage: failed gates {}", summary.failed_gates.join(", ")),
        None => println!("coverage: not evaluated"),
    }
    if let Some(gaps) = summary.gaps_found {
        println!("gaps: {gaps}");
    }
    println!("next: {}", summary.next_action);
    Ok(())
}

/// Resolve the run root, defaulting to the local data dir keyed by source name.
pub fn resolve_run_root(explicit: Option<&Path>, source: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let name = source
        .canonicalize()
        .ok()
        .and_then(|resolved| resolved.file_name().map(|name| name.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("cannot derive a run name from {}", source.display()))?;

    // Default to ~/.local/share/beanpack/runs/<source>
    let data_dir = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(data_dir.join("beanpack").join("runs").join(name))
}

fn print_event(event: &PipelineEvent) {
    match event.kind {
        EventKind::StageComplete if !event.detail.is_empty() => {
            let detail = event
                .detail
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            eprintln!("[{}] {} ({detail})", event.stage, event.message);
        }
        _ => eprintln!("[{}] {}", event.stage, event.message),
    }
}

fn print_result(out_root: &Path, result: &RunResult) {
    if !result.success {
        let stage = result
            .failed_stage
            .map(|stage| stage.to_string())
            .unwrap_or_else(|| "setup".to_string());
        println!("run failed at {stage}; fix the cause and rerun with --resume");
        return;
    }
    let cwd = std::env::current_dir().ok();
    println!("run root: {}", display_path(out_root, cwd.as_deref()));
    println!("beans generated: {}", result.beans_generated);
    println!("gaps found: {}", result.gaps_found);
    println!(
        "coverage: {}",
        if result.coverage_passed {
            "ALL GATES PASSED"
        } else {
            "GATES FAILED (see coverage.md)"
        }
    );
}

fn stage_list(stages: &[Stage]) -> String {
    if stages.is_empty() {
        return "-".to_string();
    }
    stages
        .iter()
        .map(Stage::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
