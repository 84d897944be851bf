//! Pre-compiled modules left behind by the external engine.

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{OutputError, Result};

/// One compiled module and the chunk the engine placed it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedModule {
    pub chunk: String,
    /// Path relative to the staging root, matched against asset rules
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl StagedModule {
    pub fn new(chunk: impl Into<String>, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            chunk: chunk.into(),
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Read every file under `dir`.
///
/// Files in `<dir>/<chunk>/...` belong to `<chunk>`; top-level files belong to
/// `entry_chunk`. Files are visited in file-name order so output is
/// reproducible.
pub fn collect_staged(dir: &Path, entry_chunk: &str) -> Result<Vec<StagedModule>> {
    if !dir.is_dir() {
        return Err(OutputError::StagingNotFound(dir.to_path_buf()));
    }

    let mut modules = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| OutputError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_path_buf();
        let chunk = chunk_of(&relative).unwrap_or(entry_chunk).to_string();
        let content = fs::read(entry.path()).map_err(|source| OutputError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;

        tracing::trace!(chunk = %chunk, path = %relative.display(), "staged module");
        modules.push(StagedModule {
            chunk,
            path: relative,
            content,
        });
    }

    tracing::debug!(dir = %dir.display(), modules = modules.len(), "collected staged modules");
    Ok(modules)
}

fn chunk_of(relative: &Path) -> Option<&str> {
    let mut components = relative.components();
    let first = components.next()?;
    // A file directly in the staging root has no chunk directory.
    components.next()?;
    match first {
        Component::Normal(name) => name.to_str(),
        _ => None,
    }
}
