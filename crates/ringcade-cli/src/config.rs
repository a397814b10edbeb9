//! Build configuration.
//!
//! Command-line flags are collected into a [`BuildConfig`] value that is
//! passed explicitly into the build entry point.

use std::path::{Path, PathBuf};

/// Default directory scanned for notation sources.
pub const DEFAULT_SOURCE_DIR: &str = "data/ringtones";

/// Default path of the bundle handed to the emission adapter.
pub const DEFAULT_OUTPUT_FILE: &str = "build/ringtone_data.json";

/// Default path of the change-detection manifest.
pub const DEFAULT_MANIFEST_FILE: &str = ".ringtone_cache";

/// Settings for one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Directory containing `*.rtttl.txt` sources (not recursive).
    pub source_dir: PathBuf,
    /// Bundle output path.
    pub output_file: PathBuf,
    /// Manifest path.
    pub manifest_path: PathBuf,
    /// Regenerate even if the cache is valid.
    pub force: bool,
    /// Print per-source detail, including field warnings.
    pub verbose: bool,
    /// Exit with failure if any source was skipped.
    pub strict: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_FILE),
            force: false,
            verbose: false,
            strict: false,
        }
    }
}

impl BuildConfig {
    /// Creates a config from optional overrides, falling back to defaults.
    pub fn from_args(
        source_dir: Option<&str>,
        output_file: Option<&str>,
        manifest_path: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            source_dir: source_dir.map(PathBuf::from).unwrap_or(defaults.source_dir),
            output_file: output_file.map(PathBuf::from).unwrap_or(defaults.output_file),
            manifest_path: manifest_path
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_path),
            ..defaults
        }
    }

    /// Sets the force flag.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets the verbose flag.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the strict flag.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Source directory as a path.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::from_args(None, None, None);
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.source_dir, PathBuf::from("data/ringtones"));
        assert_eq!(config.output_file, PathBuf::from("build/ringtone_data.json"));
        assert_eq!(config.manifest_path, PathBuf::from(".ringtone_cache"));
    }

    #[test]
    fn test_overrides_and_flags() {
        let config = BuildConfig::from_args(Some("tones"), Some("out.json"), Some("m.json"))
            .force(true)
            .verbose(true)
            .strict(true);
        assert_eq!(config.source_dir(), Path::new("tones"));
        assert_eq!(config.output_file, PathBuf::from("out.json"));
        assert_eq!(config.manifest_path, PathBuf::from("m.json"));
        assert!(config.force && config.verbose && config.strict);
    }
}
