//! Checkpoint persistence for resumable runs.
//!
//! The checkpoint is a plain completed/pending partition of the stage set.
//! Every mutation is written through immediately so a crash between stages
//! never loses completed work. Ordering is the orchestrator's job.
use crate::paths::RunPaths;
use crate::stage::Stage;
use crate::util::{now_epoch_ms, read_json, write_json};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Current schema version for `.beanpack/checkpoint.json`.
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// Persisted record of which stages have completed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PipelineCheckpoint {
    pub schema_version: u32,
    pub completed: Vec<Stage>,
    pub pending: Vec<Stage>,
    #[serde(default)]
    pub updated_at_epoch_ms: u128,
}

impl PipelineCheckpoint {
    /// Create a checkpoint with every stage pending.
    pub fn fresh(stages: &[Stage]) -> Result<Self> {
        if stages.is_empty() {
            return Err(anyhow!("checkpoint requires at least one stage"));
        }
        let mut pending = Vec::with_capacity(stages.len());
        for stage in stages {
            if pending.contains(stage) {
                return Err(anyhow!("duplicate stage {stage} in checkpoint stage list"));
            }
            pending.push(*stage);
        }
        Ok(Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            completed: Vec::new(),
            pending,
            updated_at_epoch_ms: 0,
        })
    }

    /// Every stage tracked by this checkpoint.
    pub fn stage_set(&self) -> BTreeSet<Stage> {
        self.completed
            .iter()
            .chain(self.pending.iter())
            .copied()
            .collect()
    }

    pub fn is_done(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    fn validate(&self) -> Result<()> {
        if self.schema_version != CHECKPOINT_SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported checkpoint schema_version {}",
                self.schema_version
            ));
        }
        let completed: BTreeSet<Stage> = self.completed.iter().copied().collect();
        let pending: BTreeSet<Stage> = self.pending.iter().copied().collect();
        if completed.len() != self.completed.len() || pending.len() != self.pending.len() {
            return Err(anyhow!("checkpoint lists a stage more than once"));
        }
        if let Some(stage) = completed.intersection(&pending).next() {
            return Err(anyhow!("stage {stage} is both completed and pending"));
        }
        if completed.is_empty() && pending.is_empty() {
            return Err(anyhow!("checkpoint tracks no stages"));
        }
        Ok(())
    }
}

/// Read a checkpoint from a run root without taking ownership of the run.
pub fn read_checkpoint(run_root: &Path) -> Result<Option<PipelineCheckpoint>> {
    let path = RunPaths::new(run_root.to_path_buf()).checkpoint_path();
    if !path.is_file() {
        return Ok(None);
    }
    let checkpoint: PipelineCheckpoint = read_json(&path)?;
    checkpoint.validate()?;
    Ok(Some(checkpoint))
}

/// Owns the checkpoint of one run directory.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    checkpoint: Option<PipelineCheckpoint>,
}

impl CheckpointStore {
    pub fn new(paths: &RunPaths) -> Self {
        Self {
            path: paths.checkpoint_path(),
            checkpoint: None,
        }
    }

    /// Start a fresh in-memory checkpoint with every stage pending.
    pub fn initialize(&mut self, stages: &[Stage]) -> Result<()> {
        self.checkpoint = Some(PipelineCheckpoint::fresh(stages)?);
        Ok(())
    }

    pub fn is_stage_done(&self, stage: Stage) -> bool {
        self.checkpoint
            .as_ref()
            .is_some_and(|checkpoint| checkpoint.is_done(stage))
    }

    /// Move a stage from pending to completed and persist immediately.
    ///
    /// Completing an already-completed stage is a no-op.
    pub fn complete_stage(&mut self, stage: Stage) -> Result<()> {
        let checkpoint = self
            .checkpoint
            .as_mut()
            .ok_or_else(|| anyhow!("checkpoint not initialized"))?;
        if checkpoint.is_done(stage) {
            return Ok(());
        }
        let position = checkpoint
            .pending
            .iter()
            .position(|pending| *pending == stage)
            .ok_or_else(|| anyhow!("stage {stage} is not tracked by this checkpoint"))?;
        checkpoint.pending.remove(position);
        checkpoint.completed.push(stage);
        self.persist()
    }

    /// Try to read a prior checkpoint from disk.
    ///
    /// Returns whether one was found; a found checkpoint replaces the
    /// in-memory one, but only if it tracks the same stage set.
    pub fn load(&mut self) -> Result<bool> {
        if !self.path.is_file() {
            return Ok(false);
        }
        let loaded: PipelineCheckpoint = read_json(&self.path)?;
        loaded
            .validate()
            .with_context(|| format!("validate {}", self.path.display()))?;
        if let Some(current) = self.checkpoint.as_ref() {
            if current.stage_set() != loaded.stage_set() {
                return Err(anyhow!(
                    "checkpoint at {} tracks a different stage set",
                    self.path.display()
                ));
            }
        }
        self.checkpoint = Some(loaded);
        Ok(true)
    }

    /// Flush the current state; safe to call on every terminal path.
    pub fn finalize(&mut self) -> Result<()> {
        if self.checkpoint.is_none() {
            return Ok(());
        }
        self.persist()
    }

    pub fn completed(&self) -> &[Stage] {
        self.checkpoint
            .as_ref()
            .map(|checkpoint| checkpoint.completed.as_slice())
            .unwrap_or(&[])
    }

    pub fn pending(&self) -> &[Stage] {
        self.checkpoint
            .as_ref()
            .map(|checkpoint| checkpoint.pending.as_slice())
            .unwrap_or(&[])
    }

    fn persist(&mut self) -> Result<()> {
        let Some(checkpoint) = self.checkpoint.as_mut() else {
            return Ok(());
        };
        checkpoint.updated_at_epoch_ms = now_epoch_ms()?;
        write_json(&self.path, checkpoint).context("persist checkpoint")
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
