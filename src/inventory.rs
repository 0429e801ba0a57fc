//! Source file inventory and stack detection.
//!
//! The inventory is cheap to rebuild, so it is recomputed on every run
//! instead of being restored from the checkpoint.
use crate::config::RunConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Current schema version for `inventory.json`.
pub const INVENTORY_SCHEMA_VERSION: u32 = 1;

const BINARY_SNIFF_BYTES: usize = 8192;

/// Marker files that reveal the repository's stack.
const STACK_MARKERS: [(&str, &str); 14] = [
    ("Cargo.toml", "rust"),
    ("package.json", "node"),
    ("tsconfig.json", "typescript"),
    ("next.config.js", "nextjs"),
    ("next.config.mjs", "nextjs"),
    ("requirements.txt", "python"),
    ("pyproject.toml", "python"),
    ("manage.py", "django"),
    ("go.mod", "go"),
    ("pom.xml", "java"),
    ("build.gradle", "java"),
    ("Gemfile", "ruby"),
    ("composer.json", "php"),
    ("mix.exs", "elixir"),
];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooLarge,
    Binary,
    Unreadable,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct InventoryFile {
    /// Path relative to the source root, `/`-separated.
    pub path: String,
    pub bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct FileInventory {
    pub schema_version: u32,
    pub files: Vec<InventoryFile>,
    pub scanned: usize,
    pub skipped: usize,
    #[serde(default)]
    pub stack: Vec<String>,
}

impl FileInventory {
    /// Files considered: scanned plus skipped.
    pub fn total(&self) -> usize {
        self.scanned + self.skipped
    }
}

/// Walk the source root and classify every file.
///
/// `exclude` names a directory to leave out of the walk, normally the run
/// root when it sits inside the source tree. Both paths are compared after
/// canonicalization.
pub fn scan_inventory(
    source_root: &Path,
    config: &RunConfig,
    exclude: Option<&Path>,
) -> Result<FileInventory> {
    if !source_root.is_dir() {
        return Err(anyhow!(
            "source root {} is not a directory",
            source_root.display()
        ));
    }
    let root = source_root
        .canonicalize()
        .with_context(|| format!("resolve {}", source_root.display()))?;
    let exclude = exclude.and_then(|path| path.canonicalize().ok());
    let walker = Walker {
        root: &root,
        config,
        exclude: exclude.as_deref(),
    };
    let mut files = Vec::new();
    walker.walk(&root, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let skipped = files.iter().filter(|file| file.skip_reason.is_some()).count();
    let stack = detect_stack(&files);
    Ok(FileInventory {
        schema_version: INVENTORY_SCHEMA_VERSION,
        scanned: files.len() - skipped,
        skipped,
        stack,
        files,
    })
}

struct Walker<'a> {
    root: &'a Path,
    config: &'a RunConfig,
    exclude: Option<&'a Path>,
}

impl Walker<'_> {
    fn walk(&self, dir: &Path, files: &mut Vec<InventoryFile>) -> Result<()> {
        for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
            let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("stat {}", path.display()))?;
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                let name = entry.file_name();
                if self.config.ignores_dir(&name.to_string_lossy())
                    || self.exclude == Some(path.as_path())
                {
                    continue;
                }
                self.walk(&path, files)?;
            } else if file_type.is_file() {
                files.push(classify_file(self.root, &path, self.config.max_file_bytes));
            }
        }
        Ok(())
    }
}

fn classify_file(root: &Path, path: &Path, max_file_bytes: u64) -> InventoryFile {
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    let skip_reason = if bytes > max_file_bytes {
        Some(SkipReason::TooLarge)
    } else {
        match looks_binary(path) {
            Ok(true) => Some(SkipReason::Binary),
            Ok(false) => None,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "unreadable file");
                Some(SkipReason::Unreadable)
            }
        }
    };
    InventoryFile {
        path: rel,
        bytes,
        skip_reason,
    }
}

fn looks_binary(path: &Path) -> Result<bool> {
    let mut file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = [0u8; BINARY_SNIFF_BYTES];
    let read = file
        .read(&mut buf)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(buf[..read].contains(&0))
}

/// Stack labels implied by marker files anywhere in the tree.
pub fn detect_stack(files: &[InventoryFile]) -> Vec<String> {
    let mut stack = BTreeSet::new();
    for file in files {
        let name = file.path.rsplit('/').next().unwrap_or(&file.path);
        for (marker, label) in STACK_MARKERS {
            if name == marker {
                stack.insert(label.to_string());
            }
        }
    }
    stack.into_iter().collect()
}
