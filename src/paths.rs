//! Typed paths into a run output directory.
//!
//! Centralizing path construction keeps every stage reading and writing the
//! same layout, which is what makes a later resume able to find prior work.
use std::path::{Path, PathBuf};

/// Convenience wrapper for locating run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    /// Create a new path helper rooted at the run output directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the run root used for path derivation.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `.beanpack/` state directory path.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".beanpack")
    }

    /// Return the `.beanpack/checkpoint.json` path.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.state_dir().join("checkpoint.json")
    }

    /// Return the `beanpack.json` config path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("beanpack.json")
    }

    /// Return the `inventory.json` path.
    pub fn inventory_path(&self) -> PathBuf {
        self.root.join("inventory.json")
    }

    /// Return the `surfaces.json` snapshot path.
    pub fn surfaces_path(&self) -> PathBuf {
        self.root.join("surfaces.json")
    }

    /// Return the `traceability.json` path.
    pub fn traceability_path(&self) -> PathBuf {
        self.root.join("traceability.json")
    }

    /// Return the `beans/` directory path.
    pub fn beans_dir(&self) -> PathBuf {
        self.root.join("beans")
    }

    /// Return the `beans/manifest.json` path.
    pub fn manifest_path(&self) -> PathBuf {
        self.beans_dir().join("manifest.json")
    }

    pub fn coverage_json_path(&self) -> PathBuf {
        self.root.join("coverage.json")
    }

    pub fn coverage_markdown_path(&self) -> PathBuf {
        self.root.join("coverage.md")
    }

    pub fn gaps_json_path(&self) -> PathBuf {
        self.root.join("gaps.json")
    }

    pub fn gaps_markdown_path(&self) -> PathBuf {
        self.root.join("gaps.md")
    }

    /// Resolve a run-relative artifact path against the root.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}
