//! Error and warning types for notation parsing.

use serde::Serialize;
use thiserror::Error;

/// Warning codes for field-level problems the parser recovers from.
///
/// A warning never fails a parse: the affected field keeps the value that
/// was in scope (built-in default or section default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// W001: Default value is not a usable integer
    MalformedDefault,
    /// W002: Unrecognized key in the defaults section
    UnknownDefaultKey,
    /// W003: Note duration or octave digits could not be used
    MalformedNoteField,
    /// W004: Unexpected characters after a note were dropped
    TrailingCharacters,
    /// W005: Note has no pitch letter and is treated as a rest
    MissingPitch,
}

impl WarningCode {
    /// Returns the warning code string (e.g., "W001").
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::MalformedDefault => "W001",
            WarningCode::UnknownDefaultKey => "W002",
            WarningCode::MalformedNoteField => "W003",
            WarningCode::TrailingCharacters => "W004",
            WarningCode::MissingPitch => "W005",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A recovered field problem with code, message, and optional location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    /// The warning code.
    pub code: WarningCode,
    /// Human-readable warning message.
    pub message: String,
    /// Where the field sits in the notation (e.g., "notes\[3\]").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FieldWarning {
    /// Creates a new field warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Creates a new field warning with a location.
    pub fn with_location(
        code: WarningCode,
        message: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            location: Some(location.into()),
        }
    }
}

impl std::fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref location) = self.location {
            write!(f, "{}: {} (at {})", self.code, self.message, location)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Structural failure: the notation cannot produce any encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text lacks the `name:defaults:notes` sections.
    #[error("expected `name:defaults:notes`, found {found} section(s)")]
    MissingSections {
        /// Number of colon-separated sections actually present.
        found: usize,
    },
}

impl ParseError {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::MissingSections { .. } => "E001",
        }
    }
}

/// Failure to turn raw source bytes into something the parser can read.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file is not UTF-8 text.
    #[error("source is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The text failed structural parsing.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SourceError {
    /// Returns the error code string (e.g., "E002").
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::InvalidUtf8(_) => "E002",
            SourceError::Parse(err) => err.code(),
        }
    }
}

/// Common trait for encoder errors.
///
/// Gives every encoder error a stable code and a category so the CLI can
/// report failures uniformly without knowing each encoder's error type.
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting (e.g., "TRACK_001").
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category (e.g., "compact", "track").
    fn category(&self) -> &'static str;
}
