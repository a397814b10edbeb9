//! Ringcade Backend - Compact and Track Encoders
//!
//! This crate turns a parsed [`Ringtone`] into the two binary forms consumed
//! by the game:
//!
//! - **Compact**: 13-byte header and two bytes per token, for the embedded
//!   player. Lossy: durations, octaves, and tempo are snapped to fixed tables.
//! - **Track**: `BPHR` header, name block, and 8-byte timed note records with
//!   lane assignments, for rhythm gameplay.
//!
//! # Determinism
//!
//! Both encoders are pure functions of the parsed ringtone. Equal inputs give
//! byte-identical outputs, so blob hashes can be compared across runs.
//!
//! # Example
//!
//! ```
//! use ringcade_backend::encode;
//! use ringcade_spec::parse_notation;
//!
//! let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
//! let encodings = encode(&ringtone).unwrap();
//! assert_eq!(encodings.compact.byte_len(), 19);
//! assert_eq!(encodings.track.byte_len(), 37);
//! ```
//!
//! # Module Structure
//!
//! - [`tables`]: Fixed lookup tables for the compact format
//! - [`compact`]: Compact encoder
//! - [`track`]: Timeline computation and track encoder
//! - [`blob`]: Encoded output type

pub mod blob;
pub mod compact;
pub mod error;
pub mod tables;
pub mod track;

use ringcade_spec::Ringtone;

pub use blob::{BlobFormat, EncodedBlob};
pub use compact::encode_compact;
pub use error::{EncodeError, EncodeResult};
pub use track::{build_timeline, encode_track, Timeline, TrackNote};

/// Crate version for generator identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encoder identifier recorded in the cache manifest `generator` field.
pub const BACKEND_ID: &str = "ringcade-backend";

/// Both encodings of one ringtone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encodings {
    /// Compact form.
    pub compact: EncodedBlob,
    /// Track form.
    pub track: EncodedBlob,
}

/// Encodes a ringtone into both forms.
///
/// # Errors
/// Fails only if the track form cannot represent the melody.
pub fn encode(ringtone: &Ringtone) -> EncodeResult<Encodings> {
    Ok(Encodings {
        compact: encode_compact(ringtone),
        track: encode_track(ringtone)?,
    })
}
