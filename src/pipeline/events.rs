//! Progress events and the observer seam.
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StageStarted,
    StageComplete,
    StageError,
    Progress,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StageStarted => "stage_started",
            EventKind::StageComplete => "stage_complete",
            EventKind::StageError => "stage_error",
            EventKind::Progress => "progress",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification from the orchestrator.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PipelineEvent {
    pub kind: EventKind,
    pub stage: Stage,
    pub message: String,
    /// Named counts, e.g. `surfaces` or `beans`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub detail: BTreeMap<String, u64>,
}

impl PipelineEvent {
    pub fn new(kind: EventKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            detail: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, detail: BTreeMap<String, u64>) -> Self {
        self.detail = detail;
        self
    }
}

/// Receives events synchronously, on the thread that called `run`.
pub trait PipelineObserver {
    fn on_event(&self, event: &PipelineEvent);
}

impl<F> PipelineObserver for F
where
    F: Fn(&PipelineEvent),
{
    fn on_event(&self, event: &PipelineEvent) {
        self(event)
    }
}
