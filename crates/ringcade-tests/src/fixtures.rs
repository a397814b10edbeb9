//! Test fixture utilities for creating ringtone source directories.

use ringcade_cli::BuildConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The reference melody with known compact and track bytes.
pub const WORKED_EXAMPLE: &str = "Test:d=4,o=5,b=160:4c,4p,8e";

/// Well-formed sources as `(filename, text)` pairs.
pub const SAMPLE_RINGTONES: &[(&str, &str)] = &[
    (
        "mario.rtttl.txt",
        "Mario:d=4,o=5,b=100:16e6,16e6,32p,8e6,16c6,8e6,8g6,8p,8g,8p",
    ),
    (
        "nokia.rtttl.txt",
        "Nokia:d=4,o=5,b=225:8e6,8d6,f#,g#,8c#6,8b,d,e,8b,8a,c#,e,2a",
    ),
    ("test.rtttl.txt", WORKED_EXAMPLE),
];

/// A temporary project with a ringtone source directory.
pub struct RingtoneProjectFixture {
    pub root: TempDir,
    pub source_dir: PathBuf,
}

impl RingtoneProjectFixture {
    /// Create a new project with an empty source directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let source_dir = root.path().join("data").join("ringtones");
        fs::create_dir_all(&source_dir).expect("Failed to create source dir");
        Self { root, source_dir }
    }

    /// Create a project populated with [`SAMPLE_RINGTONES`].
    pub fn with_samples() -> Self {
        let fixture = Self::new();
        for (name, text) in SAMPLE_RINGTONES {
            fixture.add_source(name, text);
        }
        fixture
    }

    /// Get the project root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a source file and return its path.
    pub fn add_source(&self, filename: &str, text: &str) -> PathBuf {
        self.add_raw(filename, text.as_bytes())
    }

    /// Write raw bytes as a source file.
    pub fn add_raw(&self, filename: &str, bytes: &[u8]) -> PathBuf {
        let path = self.source_dir.join(filename);
        fs::write(&path, bytes).expect("Failed to write source file");
        path
    }

    /// Delete a source file.
    pub fn remove_source(&self, filename: &str) {
        fs::remove_file(self.source_dir.join(filename)).expect("Failed to remove source file");
    }

    /// Bundle path inside the project.
    pub fn output_file(&self) -> PathBuf {
        self.path().join("build").join("ringtone_data.json")
    }

    /// Manifest path inside the project.
    pub fn manifest_path(&self) -> PathBuf {
        self.path().join(".ringtone_cache")
    }

    /// Build settings pointing at this project.
    pub fn config(&self) -> BuildConfig {
        BuildConfig {
            source_dir: self.source_dir.clone(),
            output_file: self.output_file(),
            manifest_path: self.manifest_path(),
            ..BuildConfig::default()
        }
    }

    /// Read the manifest as untyped JSON.
    pub fn manifest_json(&self) -> serde_json::Value {
        let text = fs::read_to_string(self.manifest_path()).expect("Failed to read manifest");
        serde_json::from_str(&text).expect("Manifest is not valid JSON")
    }
}

impl Default for RingtoneProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
