//! Cache management commands

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use crate::cache::{CacheManager, ManifestLoad};

/// Remove the cache manifest
pub fn clear(manifest_path: &str) -> Result<ExitCode> {
    let cache_mgr = CacheManager::new(manifest_path);

    println!("{}", "Clearing ringtone cache...".cyan().bold());

    if cache_mgr.clear()? {
        println!(
            "  {} Removed {}",
            "SUCCESS".green().bold(),
            cache_mgr.manifest_path().display()
        );
    } else {
        println!("  {}", "Cache is already empty".dimmed());
    }

    Ok(ExitCode::SUCCESS)
}

/// Show cache information
pub fn info(manifest_path: &str) -> Result<ExitCode> {
    let cache_mgr = CacheManager::new(manifest_path);

    println!("{}", "Cache Information".cyan().bold());

    let info = cache_mgr.info()?;

    println!(
        "  {}: {}",
        "Manifest".dimmed(),
        info.manifest_path.display()
    );

    match &info.state {
        ManifestLoad::Missing => {
            println!("  {}", "No manifest (next build regenerates)".dimmed());
        }
        ManifestLoad::Recovered { reason } => {
            println!(
                "  {} Manifest unusable: {}",
                "WARN".yellow().bold(),
                reason
            );
        }
        ManifestLoad::Loaded(manifest) => {
            println!("  {}: {}", "Last generated".dimmed(), manifest.timestamp);
            println!(
                "  {}: {} {}",
                "Generator".dimmed(),
                manifest.generator,
                manifest.generator_version
            );
            println!("  {}: {}", "Source directory".dimmed(), manifest.source_dir);
            println!("  {}: {}", "Output file".dimmed(), manifest.output_file);
            println!("  {}: {}", "Ringtones".dimmed(), manifest.ringtone_count);
            for (filename, hash) in &manifest.file_hashes {
                println!(
                    "    {} {}",
                    ringcade_spec::short_hash(hash).dimmed(),
                    filename
                );
            }
            if !manifest.rejected_hashes.is_empty() {
                println!(
                    "  {}: {}",
                    "Rejected".dimmed(),
                    manifest.rejected_hashes.len()
                );
                for filename in manifest.rejected_hashes.keys() {
                    println!("    {} {}", "x".red(), filename);
                }
            }
        }
    }

    let size_kb = info.size_bytes as f64 / 1024.0;
    println!("  {}: {:.2} KB", "Manifest size".dimmed(), size_kb);

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_info_with_non_ascii_hash() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        let json = format!(
            r#"{{
  "file_hashes": {{"a.rtttl.txt": "xéééééééééé"}},
  "ringtone_count": 1,
  "timestamp": "2024-01-01T00:00:00+00:00",
  "version": "1.0",
  "generator_version": "{}",
  "output_file": "build/ringtone_data.json",
  "source_dir": "data/ringtones"
}}"#,
            ringcade_backend::VERSION
        );
        std::fs::write(&path, json).unwrap();

        let path = path.to_str().unwrap();
        assert!(CacheManager::new(path).load().unwrap().manifest().is_some());
        assert!(info(path).is_ok());
    }

    #[test]
    fn test_info_and_clear_with_binary_manifest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".ringtone_cache");
        std::fs::write(&path, [0xFF, 0xFE, 0x7B, 0x00]).unwrap();

        let path_str = path.to_str().unwrap();
        assert!(info(path_str).is_ok());
        assert!(clear(path_str).is_ok());
        assert!(!path.exists());
    }
}
