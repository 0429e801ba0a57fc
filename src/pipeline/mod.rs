//! Pipeline orchestrator: runs the fixed stage sequence against one run root.
//!
//! Each stage either completes (and is checkpointed) or fails the run. On a
//! resumed run, completed stages are skipped but the values later stages need
//! are rebuilt, either by recomputing them or by reloading their artifacts.
mod events;
mod result;

use crate::checkpoint::CheckpointStore;
use crate::config::{validate_config, RunConfig};
use crate::coverage::{
    compute_metrics, evaluate_thresholds, write_coverage_reports, CoverageReport,
};
use crate::extract::{SurfaceEnricher, SurfaceExtractor};
use crate::gaps::{run_all_gap_queries, write_gap_reports, GapReport};
use crate::inventory::{scan_inventory, FileInventory};
use crate::paths::RunPaths;
use crate::stage::Stage;
use crate::surface::{load_surfaces, write_surfaces, SurfaceCategory, SurfaceCollection};
use crate::traceability::build_traceability;
use crate::util::{read_json, write_json};
use crate::writer::{
    generated_count, load_manifest, write_manifest, DocumentWriter, WrittenArtifact,
};
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use events::{EventKind, PipelineEvent, PipelineObserver};
pub use result::RunResult;

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Local checkout to document.
    pub source_root: PathBuf,
    /// Run root receiving every artifact and the checkpoint.
    pub out_root: PathBuf,
    /// Continue from an existing checkpoint instead of starting over.
    pub resume: bool,
    pub config: RunConfig,
}

/// Sequences the stages and owns the checkpoint for one run root.
pub struct Orchestrator<'a> {
    options: PipelineOptions,
    paths: RunPaths,
    extractor: &'a dyn SurfaceExtractor,
    enricher: Option<&'a dyn SurfaceEnricher>,
    writer: &'a dyn DocumentWriter,
    observer: Option<&'a dyn PipelineObserver>,
}

/// In-memory values handed from stage to stage.
#[derive(Debug, Default)]
struct RunState {
    source_root: Option<PathBuf>,
    inventory: FileInventory,
    surfaces: SurfaceCollection,
    artifacts: Vec<WrittenArtifact>,
    coverage_passed: bool,
    gaps_found: usize,
}

impl RunState {
    fn source_root(&self) -> Result<&Path> {
        self.source_root
            .as_deref()
            .ok_or_else(|| anyhow!("source root not resolved"))
    }
}

type StageDetail = BTreeMap<String, u64>;

impl<'a> Orchestrator<'a> {
    pub fn new(
        options: PipelineOptions,
        extractor: &'a dyn SurfaceExtractor,
        writer: &'a dyn DocumentWriter,
    ) -> Self {
        let paths = RunPaths::new(options.out_root.clone());
        Self {
            options,
            paths,
            extractor,
            enricher: None,
            writer,
            observer: None,
        }
    }

    pub fn with_enricher(mut self, enricher: &'a dyn SurfaceEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn PipelineObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Run every pending stage in order.
    pub fn run(&self) -> RunResult {
        let mut checkpoint = CheckpointStore::new(&self.paths);
        if let Err(err) = self.prepare(&mut checkpoint) {
            tracing::warn!(error = %format!("{err:#}"), "pipeline setup failed");
            return RunResult::failed(None, &err);
        }

        let mut state = RunState::default();
        for stage in Stage::ALL {
            if checkpoint.is_stage_done(stage) {
                if let Err(err) = self.restore(stage, &mut state) {
                    return self.fail(stage, err, &mut checkpoint, &state);
                }
                self.emit(PipelineEvent::new(
                    EventKind::Progress,
                    stage,
                    format!("{stage} already complete; skipped"),
                ));
            } else {
                self.emit(PipelineEvent::new(
                    EventKind::StageStarted,
                    stage,
                    format!("{stage} started"),
                ));
                let detail = match self.execute(stage, &mut state) {
                    Ok(detail) => detail,
                    Err(err) => return self.fail(stage, err, &mut checkpoint, &state),
                };
                if let Err(err) = checkpoint.complete_stage(stage) {
                    return self.fail(stage, err, &mut checkpoint, &state);
                }
                self.emit(
                    PipelineEvent::new(
                        EventKind::StageComplete,
                        stage,
                        format!("{stage} complete"),
                    )
                    .with_detail(detail),
                );
            }

            if stage == Stage::Extract && state.surfaces.is_empty() {
                self.emit(PipelineEvent::new(
                    EventKind::Progress,
                    stage,
                    "no surfaces found; nothing to document",
                ));
                let empty = RunResult {
                    success: true,
                    coverage_passed: true,
                    ..RunResult::default()
                };
                return self.finish(&mut checkpoint, empty);
            }
        }

        let result = RunResult {
            success: true,
            coverage_passed: state.coverage_passed,
            beans_generated: generated_count(&state.artifacts),
            gaps_found: state.gaps_found,
            failed_stage: None,
            error: None,
        };
        self.finish(&mut checkpoint, result)
    }

    fn prepare(&self, checkpoint: &mut CheckpointStore) -> Result<()> {
        validate_config(&self.options.config)?;
        fs::create_dir_all(self.paths.root())
            .with_context(|| format!("create {}", self.paths.root().display()))?;
        checkpoint.initialize(&Stage::ALL)?;
        if self.options.resume {
            if checkpoint.load()? {
                tracing::info!(
                    completed = checkpoint.completed().len(),
                    pending = checkpoint.pending().len(),
                    "resuming from checkpoint"
                );
            } else {
                tracing::info!("no checkpoint found; starting fresh");
            }
        }
        checkpoint.finalize()
    }

    fn finish(&self, checkpoint: &mut CheckpointStore, result: RunResult) -> RunResult {
        match checkpoint.finalize() {
            Ok(()) => result,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "checkpoint finalize failed");
                RunResult::failed(None, &err)
            }
        }
    }

    fn fail(
        &self,
        stage: Stage,
        err: anyhow::Error,
        checkpoint: &mut CheckpointStore,
        state: &RunState,
    ) -> RunResult {
        let message = format!("{err:#}");
        self.emit(PipelineEvent::new(EventKind::StageError, stage, message));
        if let Err(finalize_err) = checkpoint.finalize() {
            tracing::warn!(error = %format!("{finalize_err:#}"), "checkpoint finalize failed");
        }
        RunResult {
            beans_generated: generated_count(&state.artifacts),
            ..RunResult::failed(Some(stage), &err)
        }
    }

    fn emit(&self, event: PipelineEvent) {
        match event.kind {
            EventKind::StageError => {
                tracing::warn!(stage = %event.stage, kind = %event.kind, "{}", event.message)
            }
            EventKind::StageStarted | EventKind::StageComplete | EventKind::Progress => {
                tracing::info!(stage = %event.stage, kind = %event.kind, "{}", event.message)
            }
        }
        if let Some(observer) = self.observer {
            observer.on_event(&event);
        }
    }

    /// Rebuild what later stages need from a stage that already completed.
    fn restore(&self, stage: Stage, state: &mut RunState) -> Result<()> {
        match stage {
            Stage::Clone | Stage::Inventory => {
                self.execute(stage, state)?;
            }
            Stage::Extract | Stage::Enrich => {
                state.surfaces = load_surfaces(&self.paths.surfaces_path())
                    .context("reload surfaces for resume")?;
            }
            Stage::Traceability => {}
            Stage::Document => {
                state.artifacts =
                    load_manifest(&self.paths).context("reload bean manifest for resume")?;
            }
            Stage::Gate => {
                let coverage: CoverageReport = read_json(&self.paths.coverage_json_path())?;
                let gaps: GapReport = read_json(&self.paths.gaps_json_path())?;
                state.coverage_passed = coverage.all_passed;
                state.gaps_found = gaps.total_gaps;
            }
        }
        Ok(())
    }

    fn execute(&self, stage: Stage, state: &mut RunState) -> Result<StageDetail> {
        match stage {
            Stage::Clone => self.run_clone(state),
            Stage::Inventory => self.run_inventory(state),
            Stage::Extract => self.run_extract(state),
            Stage::Enrich => self.run_enrich(state),
            Stage::Traceability => self.run_traceability(state),
            Stage::Document => self.run_document(state),
            Stage::Gate => self.run_gate(state),
        }
    }

    fn run_clone(&self, state: &mut RunState) -> Result<StageDetail> {
        let source = &self.options.source_root;
        let resolved = source
            .canonicalize()
            .with_context(|| format!("resolve source root {}", source.display()))?;
        if !resolved.is_dir() {
            return Err(anyhow!(
                "source root {} is not a directory",
                resolved.display()
            ));
        }
        state.source_root = Some(resolved);
        Ok(StageDetail::new())
    }

    fn run_inventory(&self, state: &mut RunState) -> Result<StageDetail> {
        let inventory = scan_inventory(
            state.source_root()?,
            &self.options.config,
            Some(self.paths.root()),
        )?;
        write_json(&self.paths.inventory_path(), &inventory)?;
        let detail = counts([
            ("files", inventory.total()),
            ("scanned", inventory.scanned),
            ("skipped", inventory.skipped),
        ]);
        state.inventory = inventory;
        Ok(detail)
    }

    fn run_extract(&self, state: &mut RunState) -> Result<StageDetail> {
        let surfaces = self
            .extractor
            .extract(state.source_root()?, &state.inventory)
            .context("extract surfaces")?;
        for (category, name) in surfaces.duplicate_names() {
            tracing::warn!(%category, %name, "duplicate surface name from extractor");
        }
        write_surfaces(&self.paths.surfaces_path(), &surfaces)?;
        let detail = surface_counts(&surfaces);
        state.surfaces = surfaces;
        Ok(detail)
    }

    fn run_enrich(&self, state: &mut RunState) -> Result<StageDetail> {
        let enricher = match self.enricher {
            Some(enricher) if self.options.config.enrich => enricher,
            _ => {
                tracing::debug!("enrich disabled; keeping extracted surfaces");
                return Ok(counts([("enriched", 0)]));
            }
        };
        let enriched = enricher
            .enrich(&state.surfaces)
            .context("enrich surfaces")?;
        write_surfaces(&self.paths.surfaces_path(), &enriched)?;
        let mut detail = surface_counts(&enriched);
        detail.insert("enriched".to_string(), 1);
        state.surfaces = enriched;
        Ok(detail)
    }

    fn run_traceability(&self, state: &mut RunState) -> Result<StageDetail> {
        let matrix = build_traceability(&state.surfaces);
        write_json(&self.paths.traceability_path(), &matrix)?;
        Ok(counts([
            ("links", matrix.links.len()),
            ("unlinked", matrix.unlinked.len()),
        ]))
    }

    fn run_document(&self, state: &mut RunState) -> Result<StageDetail> {
        let artifacts = self
            .writer
            .write_beans(&state.surfaces, &self.paths)
            .context("write beans")?;
        write_manifest(&self.paths, &artifacts)?;
        let generated = generated_count(&artifacts);
        let detail = counts([
            ("beans", generated),
            ("skipped", artifacts.len() - generated),
        ]);
        state.artifacts = artifacts;
        Ok(detail)
    }

    fn run_gate(&self, state: &mut RunState) -> Result<StageDetail> {
        let metrics = compute_metrics(&state.surfaces, &state.artifacts, &state.inventory);
        let evaluation = evaluate_thresholds(&metrics);
        write_coverage_reports(&self.paths, &evaluation)?;
        let gaps = run_all_gap_queries(&state.surfaces, &state.artifacts, &self.paths);
        write_gap_reports(&self.paths, &gaps)?;
        state.coverage_passed = evaluation.all_passed;
        state.gaps_found = gaps.total_gaps;
        Ok(counts([
            ("gates_failed", evaluation.failed_count()),
            ("gaps", gaps.total_gaps),
        ]))
    }
}

fn counts<const N: usize>(pairs: [(&str, usize); N]) -> StageDetail {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value as u64))
        .collect()
}

fn surface_counts(surfaces: &SurfaceCollection) -> StageDetail {
    let mut detail: StageDetail = SurfaceCategory::ALL
        .into_iter()
        .map(|category| (category.as_str().to_string(), surfaces.count(category) as u64))
        .collect();
    detail.insert("surfaces".to_string(), surfaces.len() as u64);
    detail
}
