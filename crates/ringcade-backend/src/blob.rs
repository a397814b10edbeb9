//! Encoded output blobs.

use serde::{Deserialize, Serialize};

/// Which encoding a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobFormat {
    /// 13-byte header plus two bytes per token.
    Compact,
    /// Timeline header, name block, and 8-byte note records.
    Track,
}

impl BlobFormat {
    /// Returns the string representation for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobFormat::Compact => "compact",
            BlobFormat::Track => "track",
        }
    }
}

impl std::fmt::Display for BlobFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opaque encoded byte sequence tagged with its format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBlob {
    /// Encoding of `bytes`.
    pub format: BlobFormat,
    /// Encoded data.
    pub bytes: Vec<u8>,
}

impl EncodedBlob {
    /// Wraps encoded bytes.
    pub fn new(format: BlobFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// Length of the encoded data in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Borrow the encoded data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// BLAKE3 hash of the encoded data.
    pub fn hash(&self) -> String {
        ringcade_spec::content_hash(&self.bytes)
    }

    /// Uppercase hex dump with single spaces between bytes.
    pub fn to_hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_accessors() {
        let blob = EncodedBlob::new(BlobFormat::Compact, vec![0x54, 0x0a, 0xff]);
        assert_eq!(blob.byte_len(), 3);
        assert_eq!(blob.as_bytes(), &[0x54, 0x0a, 0xff]);
        assert_eq!(blob.to_hex(), "54 0A FF");
        assert_eq!(blob.hash().len(), 64);
    }

    #[test]
    fn test_blob_format_serde() {
        let json = serde_json::to_string(&BlobFormat::Track).unwrap();
        assert_eq!(json, "\"track\"");
        assert_eq!(BlobFormat::Compact.to_string(), "compact");
    }
}
