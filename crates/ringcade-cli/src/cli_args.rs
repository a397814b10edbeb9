//! CLI argument definitions for the Ringcade command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};
use ringcade_cli::config::{DEFAULT_MANIFEST_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_SOURCE_DIR};

/// Ringcade - Ring-tone notation compiler
#[derive(Parser)]
#[command(name = "ringcade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Encode every ringtone source, skipping work when the cache is valid
    Build {
        /// Directory containing *.rtttl.txt sources
        #[arg(short, long, default_value = DEFAULT_SOURCE_DIR)]
        source_dir: String,

        /// Bundle output path
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: String,

        /// Cache manifest path
        #[arg(long, default_value = DEFAULT_MANIFEST_FILE)]
        manifest: String,

        /// Regenerate even if the cache is valid
        #[arg(short, long)]
        force: bool,

        /// Show per-source detail and field warnings
        #[arg(short, long)]
        verbose: bool,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,

        /// Exit with failure if any source was skipped
        #[arg(long)]
        strict: bool,
    },

    /// Parse one file and show its timeline and encodings
    Inspect {
        /// Path to the notation file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the change-detection cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheCommands {
    /// Remove the cache manifest, forcing the next build to regenerate
    Clear {
        /// Cache manifest path
        #[arg(long, default_value = DEFAULT_MANIFEST_FILE)]
        manifest: String,
    },
    /// Show the cache manifest contents
    Info {
        /// Cache manifest path
        #[arg(long, default_value = DEFAULT_MANIFEST_FILE)]
        manifest: String,
    },
}
