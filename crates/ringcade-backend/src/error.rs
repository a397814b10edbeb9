//! Error types for the encoders.

use ringcade_spec::BackendError;
use thiserror::Error;

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors that can occur while encoding a ringtone.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The track header stores the note count in 16 bits.
    #[error("too many sounding notes for track format: {count} (max {max})")]
    TooManyNotes {
        /// Sounding notes in the timeline.
        count: usize,
        /// Largest representable count.
        max: usize,
    },

    /// A start time or the song length does not fit in 32 bits.
    #[error("timeline overflows 32-bit milliseconds: {total_ms} ms")]
    TimelineOverflow {
        /// Cursor value that overflowed.
        total_ms: u64,
    },

    /// I/O error while writing records.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError for EncodeError {
    fn code(&self) -> &'static str {
        match self {
            EncodeError::TooManyNotes { .. } => "TRACK_001",
            EncodeError::TimelineOverflow { .. } => "TRACK_002",
            EncodeError::Io(_) => "TRACK_003",
        }
    }

    fn category(&self) -> &'static str {
        "track"
    }
}
