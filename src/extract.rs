//! Seams for the external fact producers.
//!
//! Framework-specific matchers live outside this crate; they hand the
//! pipeline a `SurfaceCollection` through these traits.
use crate::inventory::FileInventory;
use crate::surface::{load_surfaces, SurfaceCollection};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Produces the surface collection for a source tree.
///
/// Implementations must be idempotent: the same tree yields the same facts.
pub trait SurfaceExtractor {
    fn extract(&self, source_root: &Path, inventory: &FileInventory) -> Result<SurfaceCollection>;
}

/// Optional pass that adds detail to extracted surfaces.
pub trait SurfaceEnricher {
    fn enrich(&self, surfaces: &SurfaceCollection) -> Result<SurfaceCollection>;
}

/// Extractor that reads a snapshot produced by an external matcher run.
#[derive(Debug, Clone)]
pub struct SnapshotExtractor {
    path: PathBuf,
}

impl SnapshotExtractor {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SurfaceExtractor for SnapshotExtractor {
    fn extract(
        &self,
        _source_root: &Path,
        _inventory: &FileInventory,
    ) -> Result<SurfaceCollection> {
        load_surfaces(&self.path)
            .with_context(|| format!("load surface snapshot {}", self.path.display()))
    }
}

/// Extractor backed by an in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    surfaces: SurfaceCollection,
}

impl StaticExtractor {
    pub fn new(surfaces: SurfaceCollection) -> Self {
        Self { surfaces }
    }
}

impl SurfaceExtractor for StaticExtractor {
    fn extract(
        &self,
        _source_root: &Path,
        _inventory: &FileInventory,
    ) -> Result<SurfaceCollection> {
        Ok(self.surfaces.clone())
    }
}
