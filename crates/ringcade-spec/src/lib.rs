//! Ringcade Notation Library
//!
//! This crate provides the data model, parser, and content hashing for
//! ring-tone notation. A notation string describes a melody as
//! comma-separated notes with shared defaults for tempo, octave and duration:
//!
//! ```text
//! name:d=<duration>,o=<octave>,b=<bpm>:<note>,<note>,...
//! ```
//!
//! Parsing produces a [`Ringtone`], the single immutable value that every
//! encoder in `ringcade-backend` consumes.
//!
//! # Example
//!
//! ```
//! use ringcade_spec::{parse_notation, Pitch};
//!
//! let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
//! assert_eq!(ringtone.defaults.bpm, 160);
//! assert_eq!(ringtone.notes[0].pitch, Pitch::C);
//! assert_eq!(ringtone.sounding_count(), 2);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Parse errors and recovered field warnings
//! - [`hash`]: Content hashing for change detection
//! - [`notation`]: Data model and parser
//! - [`source`]: Source files and display-name extraction

pub mod error;
pub mod hash;
pub mod notation;
pub mod source;

// Re-export commonly used types at the crate root
pub use error::{BackendError, FieldWarning, ParseError, SourceError, WarningCode};
pub use hash::{content_hash, short_hash};
pub use notation::{
    display_name_of, parse_notation, Defaults, NoteToken, Pitch, Ringtone, DEFAULT_BPM,
    DEFAULT_DURATION, DEFAULT_OCTAVE, UNKNOWN_NAME,
};
pub use source::{is_source_filename, NotationSource, SOURCE_SUFFIX};
