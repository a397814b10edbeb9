//! Build command implementation
//!
//! Scans the source directory, checks the cache manifest, and either reports
//! that the previous bundle is current or regenerates every ringtone, writes
//! the bundle, and persists a new manifest.

use anyhow::{bail, Result};
use colored::Colorize;
use ringcade_backend::EncodeError;
use ringcade_spec::{BackendError, FieldWarning, SourceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::process::ExitCode;
use std::time::Instant;

use crate::cache::{
    decide, detect_changes, CacheManager, CacheManifest, CacheStatus, ChangeSet, ManifestLoad,
};
use crate::config::BuildConfig;
use crate::emit::{Bundle, EncodedRingtone, MemoryStats};
use crate::input::{scan_sources, ScannedSource};

/// Whether a build reused or replaced the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Cache was valid; nothing was encoded.
    Valid,
    /// Every source was parsed and encoded again.
    Regenerated,
}

/// Result of processing a single source
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    /// Source filename
    pub filename: String,
    /// Full path of the source on disk
    pub path: String,
    /// Display name, if the file could be decoded
    pub display_name: Option<String>,
    /// BLAKE3 hash of the raw bytes
    pub hash: String,
    /// Whether the source made it into the bundle
    pub encoded: bool,
    /// Error code if skipped
    pub error_code: Option<String>,
    /// Error message if skipped
    pub error: Option<String>,
    /// Recovered field warnings
    pub warnings: Vec<FieldWarning>,
    /// Number of notes, rests included
    pub note_count: usize,
    /// Compact blob size
    pub compact_size: Option<usize>,
    /// Track blob size
    pub track_size: Option<usize>,
}

/// Summary of one build run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Valid or regenerated
    pub status: BuildStatus,
    /// Why regeneration happened
    pub reason: Option<String>,
    /// Notice if the manifest was discarded
    pub manifest_notice: Option<String>,
    /// Sources found on disk
    pub source_count: usize,
    /// Differences from the previous manifest
    pub changes: ChangeSet,
    /// Ringtones in the bundle
    pub ringtone_count: usize,
    /// Timestamp of the manifest in effect after the run
    pub timestamp: String,
    /// Per-source results (empty for valid runs)
    pub sources: Vec<SourceReport>,
    /// Memory analysis (regenerated runs only)
    pub memory: Option<MemoryStats>,
    /// Bundle path
    pub output_file: String,
    /// Manifest path
    pub manifest_file: String,
    /// Total runtime in seconds
    pub runtime_seconds: f64,
}

impl BuildReport {
    /// Sources that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| !s.encoded)
    }

    /// Number of skipped sources.
    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }
}

/// Run the build command
///
/// # Arguments
/// * `config` - Build settings
/// * `json_output` - Whether to output a machine-readable JSON summary
///
/// # Returns
/// Exit code: 0 success, 1 if `--strict` and any source was skipped
pub fn run(config: &BuildConfig, json_output: bool) -> Result<ExitCode> {
    if !json_output {
        print_banner(config);
    }

    let report = execute(config)?;

    if json_output {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{}", json);
    } else {
        print_report(&report, config.verbose);
    }

    if config.strict && report.skipped_count() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Runs the cache state machine without printing.
///
/// # Errors
/// Fails on I/O errors and when no sources are found. Per-source parse and
/// encode failures are recorded in the report instead.
pub fn execute(config: &BuildConfig) -> Result<BuildReport> {
    let start = Instant::now();

    let sources = scan_sources(config.source_dir())?;
    if sources.is_empty() {
        bail!(
            "No notation sources (*{}) found in {}",
            ringcade_spec::SOURCE_SUFFIX,
            config.source_dir.display()
        );
    }

    let manager = CacheManager::new(&config.manifest_path);
    let load = manager.load()?;
    let manifest_notice = match &load {
        ManifestLoad::Recovered { reason } => Some(format!(
            "Ignoring cache manifest {}: {}",
            config.manifest_path.display(),
            reason
        )),
        _ => None,
    };

    let changes = detect_changes(load.manifest(), &sources);
    let status = decide(
        &load,
        &changes,
        sources.len(),
        config.output_file.exists(),
        config.force,
    );

    let mut report = BuildReport {
        status: BuildStatus::Valid,
        reason: None,
        manifest_notice,
        source_count: sources.len(),
        changes,
        ringtone_count: 0,
        timestamp: String::new(),
        sources: Vec::new(),
        memory: None,
        output_file: config.output_file.display().to_string(),
        manifest_file: config.manifest_path.display().to_string(),
        runtime_seconds: 0.0,
    };

    match status {
        CacheStatus::Valid => {
            if let Some(manifest) = load.manifest() {
                report.ringtone_count = manifest.ringtone_count;
                report.timestamp = manifest.timestamp.clone();
            }
        }
        CacheStatus::Stale(reason) => {
            report.status = BuildStatus::Regenerated;
            report.reason = Some(reason.to_string());
            regenerate(config, &manager, &sources, &mut report)?;
        }
    }

    report.runtime_seconds = start.elapsed().as_secs_f64();
    Ok(report)
}

/// Encodes every source, then writes the bundle and the manifest.
///
/// Both files are staged before either is committed. The bundle is renamed
/// into place first so a manifest on disk never describes a bundle that was
/// not written.
fn regenerate(
    config: &BuildConfig,
    manager: &CacheManager,
    sources: &[ScannedSource],
    report: &mut BuildReport,
) -> Result<()> {
    let mut encoded = Vec::new();
    let mut file_hashes = BTreeMap::new();
    let mut rejected_hashes = BTreeMap::new();

    for source in sources {
        let (source_report, entry) = process_source(source);
        match entry {
            Some(entry) => {
                file_hashes.insert(source.filename.clone(), source.hash.clone());
                encoded.push(entry);
            }
            None => {
                rejected_hashes.insert(source.filename.clone(), source.hash.clone());
            }
        }
        report.sources.push(source_report);
    }

    let bundle = Bundle::new(encoded);
    let manifest = CacheManifest::new(
        file_hashes,
        rejected_hashes,
        &config.output_file,
        &config.source_dir,
    );

    let staged_bundle = bundle.stage(&config.output_file)?;
    let staged_manifest = manager.stage(&manifest)?;
    staged_bundle.commit()?;
    staged_manifest.commit()?;

    report.ringtone_count = bundle.ringtone_count;
    report.timestamp = manifest.timestamp;
    report.memory = Some(bundle.memory_stats());
    Ok(())
}

/// Failure that skips one source.
enum SkipReason {
    Source(SourceError),
    Encode(EncodeError),
}

impl SkipReason {
    fn code(&self) -> &'static str {
        match self {
            SkipReason::Source(e) => e.code(),
            SkipReason::Encode(e) => e.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            SkipReason::Source(e) => e.to_string(),
            SkipReason::Encode(e) => e.message(),
        }
    }
}

/// Decode, parse, and encode a single source
fn process_source(source: &ScannedSource) -> (SourceReport, Option<EncodedRingtone>) {
    let mut report = SourceReport {
        filename: source.filename.clone(),
        path: source.path.display().to_string(),
        display_name: None,
        hash: source.hash.clone(),
        encoded: false,
        error_code: None,
        error: None,
        warnings: Vec::new(),
        note_count: 0,
        compact_size: None,
        track_size: None,
    };

    let result = source
        .decode()
        .map_err(SkipReason::Source)
        .and_then(|notation| {
            report.display_name = Some(notation.display_name.clone());
            let ringtone = notation.parse().map_err(SkipReason::Source)?;
            report.note_count = ringtone.notes.len();
            report.warnings = ringtone.warnings.clone();
            let encodings = ringcade_backend::encode(&ringtone).map_err(SkipReason::Encode)?;
            Ok(EncodedRingtone::new(notation, encodings))
        });

    match result {
        Ok(entry) => {
            report.encoded = true;
            report.compact_size = Some(entry.compact.size);
            report.track_size = Some(entry.track.size);
            (report, Some(entry))
        }
        Err(reason) => {
            report.error_code = Some(reason.code().to_string());
            report.error = Some(reason.message());
            (report, None)
        }
    }
}

fn print_banner(config: &BuildConfig) {
    println!("{}", "======================================".cyan());
    println!("{}", "  Ringcade Ringtone Builder".cyan());
    println!("{}", "======================================".cyan());
    println!();
    println!(
        "{} {}",
        "Source directory:".blue().bold(),
        config.source_dir.display()
    );
    println!(
        "{} {}",
        "Output file:".blue().bold(),
        config.output_file.display()
    );
    println!(
        "{} {}",
        "Cache manifest:".blue().bold(),
        config.manifest_path.display()
    );
    println!();
}

fn print_report(report: &BuildReport, verbose: bool) {
    if let Some(notice) = &report.manifest_notice {
        println!("{} {}", "WARN".yellow().bold(), notice);
    }

    println!(
        "{} Found {} ringtone source files",
        "INFO".blue().bold(),
        report.source_count
    );

    if report.status == BuildStatus::Valid {
        println!(
            "{} Cache is valid, skipping generation",
            "SKIP".green().bold()
        );
        println!("  {}: {}", "Last generated".dimmed(), report.timestamp);
        println!("  {}: {}", "Ringtones".dimmed(), report.ringtone_count);
        println!(
            "  {}: all source hashes match and {} exists",
            "Reason".dimmed(),
            report.output_file
        );
        return;
    }

    if let Some(reason) = &report.reason {
        println!("{} Regenerating: {}", "INFO".blue().bold(), reason);
    }
    print_changes(&report.changes);
    println!();

    for source in &report.sources {
        let name = source.display_name.as_deref().unwrap_or("?");
        if source.encoded {
            println!(
                "  {} {} ({})",
                "OK".green().bold(),
                name,
                source.filename.dimmed()
            );
            if verbose {
                println!(
                    "     {} notes, compact {} bytes, track {} bytes",
                    source.note_count,
                    source.compact_size.unwrap_or(0),
                    source.track_size.unwrap_or(0)
                );
            }
        } else {
            println!(
                "  {} {} - [{}] {}",
                "SKIP".red().bold(),
                source.path,
                source.error_code.as_deref().unwrap_or("?"),
                source.error.as_deref().unwrap_or("unknown error")
            );
        }
        if verbose {
            for warning in &source.warnings {
                println!("     {} {}", "!".yellow(), warning);
            }
        }
    }

    println!();
    println!("{}", "======================================".cyan());
    println!("{}", "  Build Summary".cyan());
    println!("{}", "======================================".cyan());
    println!();
    println!("{} {}", "Encoded:".green().bold(), report.ringtone_count);
    println!("{} {}", "Skipped:".yellow().bold(), report.skipped_count());
    if let Some(memory) = &report.memory {
        print_memory(memory);
    }
    println!(
        "{} {:.2}s",
        "Total runtime:".blue().bold(),
        report.runtime_seconds
    );
    println!();
    println!("{} {}", "Bundle written to:".blue().bold(), report.output_file);
    println!(
        "{} {}",
        "Cache manifest:".blue().bold(),
        report.manifest_file
    );
}

fn print_changes(changes: &ChangeSet) {
    for name in &changes.added {
        println!("  {} {}", "+".green(), name);
    }
    for name in &changes.modified {
        println!("  {} {}", "~".yellow(), name);
    }
    for name in &changes.removed {
        println!("  {} {}", "-".red(), name);
    }
}

fn print_memory(memory: &MemoryStats) {
    println!("{}", "Memory analysis:".blue().bold());
    println!("  {}: {} bytes", "Notation text".dimmed(), memory.text_bytes);
    println!(
        "  {}: {} bytes ({:.1}% saved)",
        "Compact".dimmed(),
        memory.compact_bytes,
        memory.compact_savings_percent()
    );
    println!("  {}: {} bytes", "Track".dimmed(), memory.track_bytes);
}
