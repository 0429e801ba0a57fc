//! Pipeline stage identifiers.
//!
//! Stages form a fixed, totally ordered sequence. The checkpoint stores them
//! by their stable string ids so a later process can resume the same run.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named step of the pipeline, declared in execution order.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Clone,
    Inventory,
    Extract,
    Enrich,
    Traceability,
    Document,
    Gate,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::Clone,
        Stage::Inventory,
        Stage::Extract,
        Stage::Enrich,
        Stage::Traceability,
        Stage::Document,
        Stage::Gate,
    ];

    /// Return the stable string identifier used in JSON artifacts and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Clone => "clone",
            Stage::Inventory => "inventory",
            Stage::Extract => "extract",
            Stage::Enrich => "enrich",
            Stage::Traceability => "traceability",
            Stage::Document => "document",
            Stage::Gate => "gate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_declared_in_execution_order() {
        let mut sorted = Stage::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Stage::ALL.to_vec());
        assert_eq!(Stage::ALL.first(), Some(&Stage::Clone));
        assert_eq!(Stage::ALL.last(), Some(&Stage::Gate));
    }
}
