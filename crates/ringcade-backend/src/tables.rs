//! Fixed lookup tables shared with the embedded player.
//!
//! These values are part of the compact format. Changing any entry breaks
//! compatibility with firmware that decodes the blobs.

use ringcade_spec::Pitch;

/// Note-length denominators and their 3-bit indices.
pub const DURATION_TABLE: [(u32, u8); 6] = [(1, 0), (2, 1), (4, 2), (8, 3), (16, 4), (32, 5)];

/// Index used for any denominator missing from [`DURATION_TABLE`] (quarter note).
pub const DURATION_INDEX_FALLBACK: u8 = 2;

/// Tempo steps addressable by the 5-bit bpm index, ascending.
pub const BPM_TABLE: [u32; 32] = [
    25, 28, 31, 35, 40, 45, 50, 56, 63, 70, 80, 90, 100, 112, 125, 140, 160, 180, 200, 225, 250,
    285, 320, 355, 400, 450, 500, 565, 635, 715, 800, 900,
];

/// Lowest octave representable in the 2-bit octave index.
pub const OCTAVE_BASE: u32 = 4;

/// Highest octave index.
pub const OCTAVE_INDEX_MAX: u8 = 3;

/// Maps a note-length denominator to its 3-bit index.
pub fn duration_index(duration: u32) -> u8 {
    DURATION_TABLE
        .iter()
        .find(|(denominator, _)| *denominator == duration)
        .map(|(_, index)| *index)
        .unwrap_or(DURATION_INDEX_FALLBACK)
}

/// Maps an octave to its 2-bit index: `clamp(octave - 4, 0, 3)`.
pub fn octave_index(octave: u32) -> u8 {
    octave
        .saturating_sub(OCTAVE_BASE)
        .min(OCTAVE_INDEX_MAX as u32) as u8
}

/// Maps a pitch class to its 3-bit index (c=0 .. b=6, rest=7).
pub fn pitch_index(pitch: Pitch) -> u8 {
    match pitch {
        Pitch::C => 0,
        Pitch::D => 1,
        Pitch::E => 2,
        Pitch::F => 3,
        Pitch::G => 4,
        Pitch::A => 5,
        Pitch::B => 6,
        Pitch::Rest => 7,
    }
}

/// Maps a tempo to the first [`BPM_TABLE`] entry at or above it.
///
/// Tempos above the last entry clamp to the final index.
pub fn bpm_index(bpm: u32) -> u8 {
    BPM_TABLE
        .iter()
        .position(|&step| step >= bpm)
        .unwrap_or(BPM_TABLE.len() - 1) as u8
}

/// Returns the ASCII bytes of a name, non-ASCII characters dropped,
/// truncated to `max` bytes.
pub fn ascii_name(name: &str, max: usize) -> Vec<u8> {
    name.chars()
        .filter(char::is_ascii)
        .take(max)
        .map(|c| c as u8)
        .collect()
}
