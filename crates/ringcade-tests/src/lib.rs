//! Ringcade End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the full build flow:
//!
//! - Build: source directory -> bundle and manifest
//! - Cache: valid runs, change detection, recovery from bad manifests
//! - Encoding: byte layouts and timing properties over arbitrary melodies
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ringcade-tests
//! ```

pub mod fixtures;

pub use fixtures::{RingtoneProjectFixture, SAMPLE_RINGTONES, WORKED_EXAMPLE};
