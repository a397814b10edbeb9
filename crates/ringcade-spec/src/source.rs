//! Notation sources: one file's worth of notation text.

use serde::Serialize;

use crate::error::SourceError;
use crate::notation::{display_name_of, parse_notation, Ringtone};

/// File suffix recognized as a notation source.
pub const SOURCE_SUFFIX: &str = ".rtttl.txt";

/// One input unit, immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotationSource {
    /// File name (no directory part).
    pub filename: String,
    /// Trimmed notation text.
    pub text: String,
    /// Name before the first colon, or the unknown-name sentinel.
    pub display_name: String,
}

impl NotationSource {
    /// Creates a source from raw file bytes.
    ///
    /// # Errors
    /// Returns [`SourceError::InvalidUtf8`] if the bytes are not UTF-8.
    pub fn new(filename: impl Into<String>, bytes: &[u8]) -> Result<Self, SourceError> {
        let text = std::str::from_utf8(bytes)?.trim().to_string();
        Ok(Self::from_text(filename, text))
    }

    /// Creates a source from text that is already in memory.
    pub fn from_text(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into().trim().to_string();
        let display_name = display_name_of(&text);
        Self {
            filename: filename.into(),
            text,
            display_name,
        }
    }

    /// Parses the notation text.
    pub fn parse(&self) -> Result<Ringtone, SourceError> {
        Ok(parse_notation(&self.text)?)
    }
}

/// Returns true if a file name carries the notation source suffix.
pub fn is_source_filename(name: &str) -> bool {
    name.len() > SOURCE_SUFFIX.len() && name.ends_with(SOURCE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::UNKNOWN_NAME;

    #[test]
    fn test_source_from_bytes() {
        let source = NotationSource::new("test.rtttl.txt", b"  Test:d=4,o=5,b=160:4c\n").unwrap();
        assert_eq!(source.filename, "test.rtttl.txt");
        assert_eq!(source.text, "Test:d=4,o=5,b=160:4c");
        assert_eq!(source.display_name, "Test");
        assert_eq!(source.parse().unwrap().notes.len(), 1);
    }

    #[test]
    fn test_source_rejects_invalid_utf8() {
        let err = NotationSource::new("bad.rtttl.txt", &[0xff, 0x3a, 0x3a]).unwrap_err();
        assert!(matches!(err, SourceError::InvalidUtf8(_)));
    }

    #[test]
    fn test_source_without_colon() {
        let source = NotationSource::from_text("broken.rtttl.txt", "just words");
        assert_eq!(source.display_name, UNKNOWN_NAME);
        assert!(matches!(source.parse(), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_is_source_filename() {
        assert!(is_source_filename("nokia.rtttl.txt"));
        assert!(!is_source_filename(".rtttl.txt"));
        assert!(!is_source_filename("notes.txt"));
        assert!(!is_source_filename("nokia.rtttl"));
    }
}
