//! Atomic file replacement.
//!
//! Contents are written to a temporary file in the target's directory and
//! renamed into place on commit, so readers never observe a partial file.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fully written temporary file waiting to replace its target.
///
/// Dropping it without calling [`StagedWrite::commit`] removes the
/// temporary file and leaves the target untouched.
pub struct StagedWrite {
    file: NamedTempFile,
    path: PathBuf,
}

impl StagedWrite {
    /// Target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames the temporary file over the target.
    pub fn commit(self) -> Result<()> {
        let path = self.path;
        self.file
            .persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// Writes `contents` to a temporary file next to `path` without touching
/// `path` itself.
///
/// Missing parent directories are created.
pub fn stage(path: &Path, contents: &[u8]) -> Result<StagedWrite> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    file.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    Ok(StagedWrite {
        file,
        path: path.to_path_buf(),
    })
}
