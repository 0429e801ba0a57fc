//! Staged pipeline that turns extracted repository facts into a gated
//! corpus of documentation beans.
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod extract;
pub mod gaps;
pub mod inventory;
pub mod paths;
pub mod pipeline;
pub mod stage;
pub mod surface;
pub mod traceability;
pub mod util;
pub mod workflow;
pub mod writer;
