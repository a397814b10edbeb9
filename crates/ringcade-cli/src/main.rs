//! Ringcade CLI - Command-line interface for ring-tone compilation
//!
//! This binary provides commands for building the ringtone bundle,
//! inspecting single notation files, and managing the build cache.

mod cli_args;

use clap::Parser;
use std::process::ExitCode;

use cli_args::{CacheCommands, Cli, Commands};
use ringcade_cli::commands;
use ringcade_cli::BuildConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            source_dir,
            output,
            manifest,
            force,
            verbose,
            json,
            strict,
        } => {
            let config = BuildConfig::from_args(
                Some(source_dir.as_str()),
                Some(output.as_str()),
                Some(manifest.as_str()),
            )
            .force(force)
            .verbose(verbose)
            .strict(strict);
            commands::build::run(&config, json)
        }
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
        Commands::Cache { command } => match command {
            CacheCommands::Clear { manifest } => commands::cache::clear(&manifest),
            CacheCommands::Info { manifest } => commands::cache::info(&manifest),
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
