//! Source scanning.
//!
//! Enumerates `*.rtttl.txt` files directly inside a directory, reads their
//! raw bytes, and hashes them for change detection.

use anyhow::{bail, Context, Result};
use ringcade_spec::{content_hash, is_source_filename, NotationSource, SourceError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A source file read from disk, not yet decoded.
#[derive(Debug, Clone)]
pub struct ScannedSource {
    /// Bare filename, used as the manifest key.
    pub filename: String,
    /// Full path on disk.
    pub path: PathBuf,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// BLAKE3 hash of `bytes`.
    pub hash: String,
}

impl ScannedSource {
    /// Decodes the raw bytes into a notation source.
    pub fn decode(&self) -> Result<NotationSource, SourceError> {
        NotationSource::new(self.filename.clone(), &self.bytes)
    }
}

/// Scans `dir` for notation sources, sorted by filename.
///
/// Only regular files whose names end in `.rtttl.txt` are included;
/// subdirectories are not descended into.
///
/// # Errors
/// Fails if the directory does not exist or any file cannot be read.
pub fn scan_sources(dir: &Path) -> Result<Vec<ScannedSource>> {
    if !dir.is_dir() {
        bail!("Source directory does not exist: {}", dir.display());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry =
            entry.with_context(|| format!("Failed to read source directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str() else {
            continue;
        };
        if !is_source_filename(filename) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read source file: {}", path.display()))?;
        sources.push(ScannedSource {
            filename: filename.to_string(),
            hash: content_hash(&bytes),
            path,
            bytes,
        });
    }

    Ok(sources)
}
