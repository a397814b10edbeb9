//! Ringcade CLI library.
//!
//! This crate provides the build pipeline behind the `ringcade` binary:
//! source scanning, content-hashed change detection, and the bundle handed
//! to the emission adapter.

pub mod atomic;
pub mod cache;
pub mod commands;
pub mod config;
pub mod emit;
pub mod input;

pub use config::BuildConfig;
