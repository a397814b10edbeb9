//! Content-hashed change detection for ringtone builds.
//!
//! The manifest records the BLAKE3 hash of every source that went into the
//! last bundle. A build is skipped only when:
//! - every current source hash matches the manifest
//! - no recorded source has disappeared
//! - the bundle file still exists
//! - at least one source was found
//!
//! Missing, unreadable, or outdated manifests are treated as empty.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::atomic::{stage, StagedWrite};
use crate::input::ScannedSource;

/// Manifest schema version.
pub const MANIFEST_VERSION: &str = "1.0";

/// Persisted record of the last successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Filename to hash, for sources that were encoded.
    pub file_hashes: BTreeMap<String, String>,
    /// Number of ringtones in the bundle.
    pub ringtone_count: usize,
    /// RFC 3339 time of the build.
    pub timestamp: String,
    /// Manifest schema version.
    pub version: String,
    /// Encoder that produced the bundle.
    #[serde(default)]
    pub generator: String,
    /// Encoder version that produced the bundle.
    pub generator_version: String,
    /// Bundle path.
    pub output_file: String,
    /// Scanned directory.
    pub source_dir: String,
    /// Filename to hash, for sources that failed to parse.
    #[serde(default)]
    pub rejected_hashes: BTreeMap<String, String>,
}

impl CacheManifest {
    /// Creates a manifest stamped with the current time and versions.
    pub fn new(
        file_hashes: BTreeMap<String, String>,
        rejected_hashes: BTreeMap<String, String>,
        output_file: &Path,
        source_dir: &Path,
    ) -> Self {
        Self {
            ringtone_count: file_hashes.len(),
            file_hashes,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: MANIFEST_VERSION.to_string(),
            generator: ringcade_backend::BACKEND_ID.to_string(),
            generator_version: ringcade_backend::VERSION.to_string(),
            output_file: output_file.display().to_string(),
            source_dir: source_dir.display().to_string(),
            rejected_hashes,
        }
    }

    /// Looks up the recorded hash of a source, encoded or rejected.
    pub fn known_hash(&self, filename: &str) -> Option<&str> {
        self.file_hashes
            .get(filename)
            .or_else(|| self.rejected_hashes.get(filename))
            .map(String::as_str)
    }

    /// Iterates every recorded filename, encoded or rejected.
    pub fn known_files(&self) -> impl Iterator<Item = &String> {
        self.file_hashes.keys().chain(self.rejected_hashes.keys())
    }
}

/// Outcome of reading the manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLoad {
    /// No manifest on disk.
    Missing,
    /// Manifest read and accepted.
    Loaded(CacheManifest),
    /// Manifest present but unusable; treated as empty.
    Recovered {
        /// Why the manifest was discarded.
        reason: String,
    },
}

impl ManifestLoad {
    /// The usable manifest, if any.
    pub fn manifest(&self) -> Option<&CacheManifest> {
        match self {
            ManifestLoad::Loaded(manifest) => Some(manifest),
            _ => None,
        }
    }
}

/// Source-level differences between the manifest and the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Sources not in the manifest.
    pub added: Vec<String>,
    /// Sources whose hash differs.
    pub modified: Vec<String>,
    /// Recorded sources no longer on disk.
    pub removed: Vec<String>,
}

impl ChangeSet {
    /// Returns true if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Total number of changed sources.
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// Compares current sources against a manifest.
///
/// With no manifest every source counts as added.
pub fn detect_changes(manifest: Option<&CacheManifest>, sources: &[ScannedSource]) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for source in sources {
        match manifest.and_then(|m| m.known_hash(&source.filename)) {
            Some(hash) if hash == source.hash => {}
            Some(_) => changes.modified.push(source.filename.clone()),
            None => changes.added.push(source.filename.clone()),
        }
    }

    if let Some(manifest) = manifest {
        let current: Vec<&str> = sources.iter().map(|s| s.filename.as_str()).collect();
        changes.removed = manifest
            .known_files()
            .filter(|name| !current.contains(&name.as_str()))
            .cloned()
            .collect();
        changes.removed.sort();
    }

    changes
}

/// Why a build cannot reuse the previous bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// Regeneration was requested.
    Forced,
    /// No sources were found.
    NoSources,
    /// No manifest on disk.
    ManifestMissing,
    /// Manifest discarded as unusable.
    ManifestRecovered(String),
    /// Sources were added, modified, or removed.
    SourcesChanged(usize),
    /// The bundle file is gone.
    OutputMissing,
}

impl std::fmt::Display for StaleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaleReason::Forced => write!(f, "regeneration forced"),
            StaleReason::NoSources => write!(f, "no sources found"),
            StaleReason::ManifestMissing => write!(f, "no cache manifest"),
            StaleReason::ManifestRecovered(reason) => {
                write!(f, "cache manifest unusable ({})", reason)
            }
            StaleReason::SourcesChanged(count) => write!(f, "{} source(s) changed", count),
            StaleReason::OutputMissing => write!(f, "output file missing"),
        }
    }
}

/// Result of the cache check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Previous bundle is current.
    Valid,
    /// Everything must be regenerated.
    Stale(StaleReason),
}

impl CacheStatus {
    /// Returns true if the previous bundle can be reused.
    pub fn is_valid(&self) -> bool {
        matches!(self, CacheStatus::Valid)
    }
}

/// Decides whether the previous bundle can be reused.
pub fn decide(
    load: &ManifestLoad,
    changes: &ChangeSet,
    source_count: usize,
    output_exists: bool,
    force: bool,
) -> CacheStatus {
    let reason = if force {
        StaleReason::Forced
    } else if source_count == 0 {
        StaleReason::NoSources
    } else {
        match load {
            ManifestLoad::Missing => StaleReason::ManifestMissing,
            ManifestLoad::Recovered { reason } => StaleReason::ManifestRecovered(reason.clone()),
            ManifestLoad::Loaded(_) if !changes.is_empty() => {
                StaleReason::SourcesChanged(changes.len())
            }
            ManifestLoad::Loaded(_) if !output_exists => StaleReason::OutputMissing,
            ManifestLoad::Loaded(_) => return CacheStatus::Valid,
        }
    };
    CacheStatus::Stale(reason)
}

/// Reads and writes the manifest file.
pub struct CacheManager {
    manifest_path: PathBuf,
}

impl CacheManager {
    /// Creates a manager for the manifest at `manifest_path`.
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    /// Path of the manifest file.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Loads the manifest, recovering from corrupt or outdated files.
    ///
    /// A manifest that exists but cannot be read or parsed is reported as
    /// [`ManifestLoad::Recovered`], never as an error.
    pub fn load(&self) -> Result<ManifestLoad> {
        if !self.manifest_path.exists() {
            return Ok(ManifestLoad::Missing);
        }

        let bytes = match fs::read(&self.manifest_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(ManifestLoad::Recovered {
                    reason: format!("unreadable: {}", e),
                })
            }
        };

        let manifest: CacheManifest = match serde_json::from_slice(&bytes) {
            Ok(manifest) => manifest,
            Err(e) => {
                return Ok(ManifestLoad::Recovered {
                    reason: format!("invalid JSON: {}", e),
                })
            }
        };

        if manifest.version != MANIFEST_VERSION {
            return Ok(ManifestLoad::Recovered {
                reason: format!("manifest version {}", manifest.version),
            });
        }
        if manifest.generator_version != ringcade_backend::VERSION {
            return Ok(ManifestLoad::Recovered {
                reason: format!("generated by version {}", manifest.generator_version),
            });
        }

        Ok(ManifestLoad::Loaded(manifest))
    }

    /// Writes the manifest atomically.
    pub fn save(&self, manifest: &CacheManifest) -> Result<()> {
        self.stage(manifest)?.commit()
    }

    /// Serializes the manifest to a temporary file beside the manifest path.
    pub fn stage(&self, manifest: &CacheManifest) -> Result<StagedWrite> {
        let json = serde_json::to_string_pretty(manifest)
            .context("Failed to serialize cache manifest")?;
        stage(&self.manifest_path, json.as_bytes()).context("Failed to write cache manifest")
    }

    /// Removes the manifest. Returns false if there was none.
    pub fn clear(&self) -> Result<bool> {
        if !self.manifest_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.manifest_path).with_context(|| {
            format!(
                "Failed to remove cache manifest: {}",
                self.manifest_path.display()
            )
        })?;
        Ok(true)
    }

    /// Get cache info
    pub fn info(&self) -> Result<CacheInfo> {
        let size_bytes = match fs::metadata(&self.manifest_path) {
            Ok(meta) => meta.len(),
            Err(_) => 0,
        };
        Ok(CacheInfo {
            manifest_path: self.manifest_path.clone(),
            size_bytes,
            state: self.load()?,
        })
    }
}

/// Cache information
#[derive(Debug, Clone)]
pub struct CacheInfo {
    /// Manifest path
    pub manifest_path: PathBuf,
    /// Manifest size in bytes
    pub size_bytes: u64,
    /// Load outcome
    pub state: ManifestLoad,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn source(filename: &str, hash: &str) -> ScannedSource {
        ScannedSource {
            filename: filename.to_string(),
            path: PathBuf::from(filename),
            bytes: Vec::new(),
            hash: hash.to_string(),
        }
    }

    fn manifest(encoded: &[(&str, &str)], rejected: &[(&str, &str)]) -> CacheManifest {
        let to_map = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        CacheManifest::new(
            to_map(encoded),
            to_map(rejected),
            Path::new("build/ringtone_data.json"),
            Path::new("data/ringtones"),
        )
    }

    #[test]
    fn test_detect_changes_without_manifest() {
        let sources = vec![source("a.rtttl.txt", "1"), source("b.rtttl.txt", "2")];
        let changes = detect_changes(None, &sources);
        assert_eq!(changes.added, vec!["a.rtttl.txt", "b.rtttl.txt"]);
        assert!(changes.modified.is_empty());
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn test_detect_changes_classifies() {
        let previous = manifest(
            &[("a.rtttl.txt", "1"), ("b.rtttl.txt", "2"), ("gone.rtttl.txt", "3")],
            &[],
        );
        let sources = vec![
            source("a.rtttl.txt", "1"),
            source("b.rtttl.txt", "changed"),
            source("new.rtttl.txt", "4"),
        ];
        let changes = detect_changes(Some(&previous), &sources);
        assert_eq!(
            changes,
            ChangeSet {
                added: vec!["new.rtttl.txt".to_string()],
                modified: vec!["b.rtttl.txt".to_string()],
                removed: vec!["gone.rtttl.txt".to_string()],
            }
        );
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_unchanged_rejected_source_is_not_a_change() {
        let previous = manifest(&[("a.rtttl.txt", "1")], &[("bad.rtttl.txt", "9")]);
        let sources = vec![source("a.rtttl.txt", "1"), source("bad.rtttl.txt", "9")];
        assert!(detect_changes(Some(&previous), &sources).is_empty());
    }

    #[test]
    fn test_decide_valid_only_when_everything_holds() {
        let previous = manifest(&[("a.rtttl.txt", "1")], &[]);
        let load = ManifestLoad::Loaded(previous);
        let none = ChangeSet::default();

        assert_eq!(decide(&load, &none, 1, true, false), CacheStatus::Valid);
        assert_eq!(
            decide(&load, &none, 1, true, true),
            CacheStatus::Stale(StaleReason::Forced)
        );
        assert_eq!(
            decide(&load, &none, 1, false, false),
            CacheStatus::Stale(StaleReason::OutputMissing)
        );
        assert_eq!(
            decide(&load, &none, 0, true, false),
            CacheStatus::Stale(StaleReason::NoSources)
        );

        let changed = ChangeSet {
            added: vec!["b.rtttl.txt".to_string()],
            ..ChangeSet::default()
        };
        assert_eq!(
            decide(&load, &changed, 2, true, false),
            CacheStatus::Stale(StaleReason::SourcesChanged(1))
        );
    }

    #[test]
    fn test_decide_missing_or_recovered_manifest() {
        let none = ChangeSet::default();
        assert_eq!(
            decide(&ManifestLoad::Missing, &none, 1, true, false),
            CacheStatus::Stale(StaleReason::ManifestMissing)
        );
        let recovered = ManifestLoad::Recovered {
            reason: "invalid JSON".to_string(),
        };
        assert!(!decide(&recovered, &none, 1, true, false).is_valid());
    }

    #[test]
    fn test_manager_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let manager = CacheManager::new(tmp.path().join(".ringtone_cache"));
        assert_eq!(manager.load().unwrap(), ManifestLoad::Missing);

        let saved = manifest(&[("a.rtttl.txt", "1")], &[("bad.rtttl.txt", "2")]);
        manager.save(&saved).unwrap();
        assert_eq!(manager.load().unwrap(), ManifestLoad::Loaded(saved.clone()));

        let json = fs::read_to_string(manager.manifest_path()).unwrap();
        assert!(json.contains("\"file_hashes\""));
        assert!(json.contains("\"rejected_hashes\""));
        assert!(json.contains("\"generator\": \"ringcade-backend\""));
        assert!(json.contains("\"ringtone_count\": 1"));
    }

    #[test]
    fn test_manager_recovers_from_corruption() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        fs::write(&path, "{ not json").unwrap();
        let manager = CacheManager::new(&path);
        assert!(matches!(
            manager.load().unwrap(),
            ManifestLoad::Recovered { .. }
        ));
    }

    #[test]
    fn test_manager_recovers_from_non_utf8_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        fs::write(&path, [0xFF, 0xFE, 0x7B, 0x00]).unwrap();
        let manager = CacheManager::new(&path);
        assert!(matches!(
            manager.load().unwrap(),
            ManifestLoad::Recovered { .. }
        ));
        assert!(manager.info().unwrap().state.manifest().is_none());
    }

    #[test]
    fn test_manager_recovers_from_unreadable_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            CacheManager::new(&path).load().unwrap(),
            ManifestLoad::Recovered { reason } if reason.starts_with("unreadable")
        ));
    }

    #[test]
    fn test_manager_rejects_other_versions() {
        let tmp = TempDir::new().unwrap();
        let manager = CacheManager::new(tmp.path().join(".ringtone_cache"));

        let mut old = manifest(&[("a.rtttl.txt", "1")], &[]);
        old.version = "0.9".to_string();
        manager.save(&old).unwrap();
        assert!(matches!(
            manager.load().unwrap(),
            ManifestLoad::Recovered { reason } if reason.contains("0.9")
        ));

        let mut other = manifest(&[("a.rtttl.txt", "1")], &[]);
        other.generator_version = "0.0.0-old".to_string();
        manager.save(&other).unwrap();
        assert!(manager.load().unwrap().manifest().is_none());
    }

    #[test]
    fn test_manager_clear_and_info() {
        let tmp = TempDir::new().unwrap();
        let manager = CacheManager::new(tmp.path().join(".ringtone_cache"));
        assert!(!manager.clear().unwrap());

        manager.save(&manifest(&[("a.rtttl.txt", "1")], &[])).unwrap();
        let info = manager.info().unwrap();
        assert!(info.size_bytes > 0);
        assert!(info.state.manifest().is_some());

        assert!(manager.clear().unwrap());
        assert!(!manager.manifest_path().exists());
        assert_eq!(manager.info().unwrap().size_bytes, 0);
    }

    #[test]
    fn test_manifest_without_rejected_hashes_still_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        let json = format!(
            r#"{{
  "file_hashes": {{"a.rtttl.txt": "1"}},
  "ringtone_count": 1,
  "timestamp": "2024-01-01T00:00:00+00:00",
  "version": "1.0",
  "generator_version": "{}",
  "output_file": "build/ringtone_data.json",
  "source_dir": "data/ringtones"
}}"#,
            ringcade_backend::VERSION
        );
        fs::write(&path, json).unwrap();
        let load = CacheManager::new(&path).load().unwrap();
        let manifest = load.manifest().unwrap();
        assert!(manifest.rejected_hashes.is_empty());
        assert_eq!(manifest.known_hash("a.rtttl.txt"), Some("1"));
    }
}
