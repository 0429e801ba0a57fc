use crate::stage::Stage;
use serde::{Deserialize, Serialize};

/// Outcome of one `Orchestrator::run` call.
///
/// Normal failures are reported here rather than as errors.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct RunResult {
    pub success: bool,
    pub coverage_passed: bool,
    pub beans_generated: usize,
    pub gaps_found: usize,
    /// Stage that failed; `None` on success or when setup failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResult {
    pub(crate) fn failed(stage: Option<Stage>, err: &anyhow::Error) -> Self {
        Self {
            failed_stage: stage,
            error: Some(format!("{err:#}")),
            ..Self::default()
        }
    }
}
