//! Bundle handoff to the emission adapter.
//!
//! The bundle is a JSON document listing every successfully encoded
//! ringtone with its source text and both binary forms. Producing compilable
//! source from it is left to the adapter.

use anyhow::{Context, Result};
use ringcade_backend::{BlobFormat, EncodedBlob, Encodings};
use ringcade_spec::NotationSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::atomic::{stage, StagedWrite};

/// Bundle schema version.
pub const BUNDLE_VERSION: &str = "1.0";

/// One encoded blob as stored in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobEntry {
    /// Encoding of `bytes`.
    pub format: BlobFormat,
    /// Length of `bytes`.
    pub size: usize,
    /// Encoded data.
    pub bytes: Vec<u8>,
}

impl From<EncodedBlob> for BlobEntry {
    fn from(blob: EncodedBlob) -> Self {
        Self {
            format: blob.format,
            size: blob.byte_len(),
            bytes: blob.bytes,
        }
    }
}

/// Everything the adapter needs for one ringtone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRingtone {
    /// Source filename.
    pub source_filename: String,
    /// Name shown to the player.
    pub display_name: String,
    /// Raw notation text.
    pub text: String,
    /// Compact form.
    pub compact: BlobEntry,
    /// Track form.
    pub track: BlobEntry,
}

impl EncodedRingtone {
    /// Pairs a source with its encodings.
    pub fn new(source: NotationSource, encodings: Encodings) -> Self {
        Self {
            source_filename: source.filename,
            display_name: source.display_name,
            text: source.text,
            compact: encodings.compact.into(),
            track: encodings.track.into(),
        }
    }
}

/// The bundle file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Bundle schema version.
    pub version: String,
    /// Number of entries in `ringtones`.
    pub ringtone_count: usize,
    /// Entries in source filename order.
    pub ringtones: Vec<EncodedRingtone>,
}

impl Bundle {
    /// Creates a bundle from encoded ringtones.
    pub fn new(ringtones: Vec<EncodedRingtone>) -> Self {
        Self {
            version: BUNDLE_VERSION.to_string(),
            ringtone_count: ringtones.len(),
            ringtones,
        }
    }

    /// Reads a bundle from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bundle: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse bundle: {}", path.display()))
    }

    /// Writes the bundle atomically.
    pub fn write(&self, path: &Path) -> Result<()> {
        self.stage(path)?.commit()
    }

    /// Serializes the bundle to a temporary file beside `path`.
    pub fn stage(&self, path: &Path) -> Result<StagedWrite> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize bundle")?;
        stage(path, json.as_bytes())
            .with_context(|| format!("Failed to write bundle: {}", path.display()))
    }

    /// Memory use of the bundled data.
    pub fn memory_stats(&self) -> MemoryStats {
        let mut stats = MemoryStats::default();
        for entry in &self.ringtones {
            stats.text_bytes += entry.text.len();
            stats.compact_bytes += entry.compact.size;
            stats.track_bytes += entry.track.size;
        }
        stats
    }
}

/// Byte totals comparing source text with the compact form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    /// Total notation text bytes.
    pub text_bytes: usize,
    /// Total compact blob bytes.
    pub compact_bytes: usize,
    /// Total track blob bytes.
    pub track_bytes: usize,
}

impl MemoryStats {
    /// Percentage of text bytes saved by the compact form.
    pub fn compact_savings_percent(&self) -> f64 {
        if self.text_bytes == 0 {
            return 0.0;
        }
        (self.text_bytes as f64 - self.compact_bytes as f64) / self.text_bytes as f64 * 100.0
    }
}
