//! Inspect command implementation
//!
//! Parses a single notation file and prints its defaults, notes, timeline,
//! lane counts, and both encoded blobs.

use anyhow::{Context, Result};
use colored::Colorize;
use ringcade_backend::{build_timeline, encode, Timeline};
use ringcade_spec::{Defaults, FieldWarning, NotationSource};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

/// JSON output for one inspected file
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    /// Source filename
    pub filename: String,
    /// Display name
    pub display_name: String,
    /// Resolved defaults
    pub defaults: Defaults,
    /// Notes in notation form
    pub notes: Vec<String>,
    /// Recovered field warnings
    pub warnings: Vec<FieldWarning>,
    /// Song length in milliseconds
    pub total_ms: u32,
    /// Sounding notes per lane
    pub lane_counts: [usize; 3],
    /// Compact blob as hex
    pub compact_hex: String,
    /// Track blob as hex
    pub track_hex: String,
}

/// Run the inspect command
///
/// # Arguments
/// * `input` - Path to a notation file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 if the file cannot be parsed or encoded
pub fn run(input: &str, json_output: bool) -> Result<ExitCode> {
    let path = Path::new(input);
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", input))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| input.to_string());

    let source = NotationSource::new(filename, &bytes)
        .with_context(|| format!("Failed to decode {}", input))?;
    let ringtone = source
        .parse()
        .with_context(|| format!("Failed to parse {}", input))?;
    let timeline = build_timeline(&ringtone)?;
    let encodings = encode(&ringtone)?;

    let output = InspectOutput {
        filename: source.filename.clone(),
        display_name: source.display_name.clone(),
        defaults: ringtone.defaults,
        notes: ringtone.notes.iter().map(|n| n.to_string()).collect(),
        warnings: ringtone.warnings.clone(),
        total_ms: timeline.total_ms,
        lane_counts: timeline.lane_counts(),
        compact_hex: encodings.compact.to_hex(),
        track_hex: encodings.track.to_hex(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human(&output, &timeline);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_human(output: &InspectOutput, timeline: &Timeline) {
    println!("{} {}", "Inspecting:".cyan().bold(), output.filename);
    println!("  {}: {}", "Name".dimmed(), output.display_name);
    println!(
        "  {}: d={}, o={}, b={}",
        "Defaults".dimmed(),
        output.defaults.duration,
        output.defaults.octave,
        output.defaults.bpm
    );
    println!("  {}: {}", "Notes".dimmed(), output.notes.join(","));

    if !output.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &output.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    println!();
    println!("{}", "Timeline:".blue().bold());
    for note in &timeline.notes {
        println!(
            "  {:>7} ms  {:>5} ms  lane {}",
            note.start_ms, note.duration_ms, note.lane
        );
    }
    println!("  {}: {} ms", "Total".dimmed(), output.total_ms);
    let [low, mid, high] = output.lane_counts;
    println!(
        "  {}: {} / {} / {}",
        "Lane counts".dimmed(),
        low,
        mid,
        high
    );

    println!();
    println!("{}", "Compact:".blue().bold());
    println!("  {}", output.compact_hex);
    println!("{}", "Track:".blue().bold());
    println!("  {}", output.track_hex);
}
