//! Content hashing for change detection.
//!
//! Every source file is identified by the BLAKE3 hash of its raw bytes, so
//! the cache never depends on timestamps or file metadata.

/// Computes the BLAKE3 hash of arbitrary data.
///
/// # Returns
/// * A 64-character lowercase hexadecimal string
///
/// # Example
/// ```
/// use ringcade_spec::hash::content_hash;
///
/// let hash = content_hash(b"Test:d=4,o=5,b=160:4c");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Returns the leading 16 characters of a hash, for display.
/// Counts characters, not bytes.
pub fn short_hash(hash: &str) -> &str {
    hash.char_indices().nth(16).map_or(hash, |(i, _)| &hash[..i])
}
