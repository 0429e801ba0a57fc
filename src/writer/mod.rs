//! Bean writing: one documentation unit per extracted surface.
//!
//! The writer is a seam; the pipeline only relies on the manifest it
//! returns. The bundled markdown writer is deliberately plain.
mod markdown;

use crate::paths::RunPaths;
use crate::surface::{SurfaceCategory, SurfaceCollection};
use crate::util::{read_json, write_json};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub use markdown::MarkdownBeanWriter;

/// Current schema version for `beans/manifest.json`.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Section headers every materialized bean must contain.
pub const REQUIRED_BEAN_SECTIONS: [&str; 2] = ["## Overview", "## Source References"];

/// Record of one generated documentation unit.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub sequence: u32,
    pub category: SurfaceCategory,
    /// Matches the surface name the bean documents.
    pub title: String,
    /// Path relative to the run root.
    pub path: String,
    /// True when the writer chose not to materialize content.
    #[serde(default)]
    pub skipped: bool,
}

impl WrittenArtifact {
    /// True when this bean documents the named surface.
    pub fn documents(&self, category: SurfaceCategory, name: &str) -> bool {
        !self.skipped && self.category == category && self.title == name
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BeanManifest {
    pub schema_version: u32,
    pub artifacts: Vec<WrittenArtifact>,
}

/// Turns surfaces into beans on disk.
///
/// Implementations must be idempotent: rerunning on the same collection
/// rewrites the same files.
pub trait DocumentWriter {
    fn write_beans(
        &self,
        surfaces: &SurfaceCollection,
        paths: &RunPaths,
    ) -> Result<Vec<WrittenArtifact>>;
}

/// Number of beans that were actually materialized.
pub fn generated_count(artifacts: &[WrittenArtifact]) -> usize {
    artifacts.iter().filter(|artifact| !artifact.skipped).count()
}

pub fn write_manifest(paths: &RunPaths, artifacts: &[WrittenArtifact]) -> Result<()> {
    let manifest = BeanManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        artifacts: artifacts.to_vec(),
    };
    write_json(&paths.manifest_path(), &manifest)
}

pub fn load_manifest(paths: &RunPaths) -> Result<Vec<WrittenArtifact>> {
    let manifest: BeanManifest = read_json(&paths.manifest_path())?;
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported bean manifest schema_version {}",
            manifest.schema_version
        ));
    }
    Ok(manifest.artifacts)
}
