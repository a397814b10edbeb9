//! Compact 10-bit-per-note encoder for the embedded player.
//!
//! Layout:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 11 | Name, ASCII, NUL padded |
//! | 11 | 1 | `duration_index \| octave_index << 3` (defaults) |
//! | 12 | 1 | `bpm_index` (defaults, 5 bits) |
//! | 13 + 2n | 1 | `duration_index \| pitch_index << 3 \| sharp << 6 \| dotted << 7` |
//! | 14 + 2n | 1 | `octave_index` (2 bits, rest reserved zero) |

use ringcade_spec::{NoteToken, Ringtone};

use crate::blob::{BlobFormat, EncodedBlob};
use crate::tables::{ascii_name, bpm_index, duration_index, octave_index, pitch_index};

/// Width of the name field.
pub const COMPACT_NAME_LEN: usize = 11;

/// Header size: name plus two packed defaults bytes.
pub const COMPACT_HEADER_SIZE: usize = COMPACT_NAME_LEN + 2;

/// Bytes per note record.
pub const COMPACT_NOTE_SIZE: usize = 2;

/// Encodes a parsed ringtone into the compact form.
///
/// Every token, rests included, produces one record, so the output is
/// always `13 + 2 * notes.len()` bytes.
///
/// # Example
/// ```
/// use ringcade_backend::compact::encode_compact;
/// use ringcade_spec::parse_notation;
///
/// let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
/// let blob = encode_compact(&ringtone);
/// assert_eq!(blob.byte_len(), 19);
/// assert_eq!(&blob.as_bytes()[11..13], &[0x0A, 0x10]);
/// ```
pub fn encode_compact(ringtone: &Ringtone) -> EncodedBlob {
    let mut bytes =
        Vec::with_capacity(COMPACT_HEADER_SIZE + COMPACT_NOTE_SIZE * ringtone.notes.len());

    let mut name = ascii_name(&ringtone.name, COMPACT_NAME_LEN);
    name.resize(COMPACT_NAME_LEN, 0);
    bytes.extend_from_slice(&name);

    let defaults = &ringtone.defaults;
    let packed_lengths =
        (duration_index(defaults.duration) & 0x07) | ((octave_index(defaults.octave) & 0x03) << 3);
    bytes.push(packed_lengths);
    bytes.push(bpm_index(defaults.bpm) & 0x1F);

    for note in &ringtone.notes {
        bytes.extend_from_slice(&pack_note(note));
    }

    EncodedBlob::new(BlobFormat::Compact, bytes)
}

/// Packs one note into its two-byte record.
pub fn pack_note(note: &NoteToken) -> [u8; 2] {
    let first = (duration_index(note.duration) & 0x07)
        | ((pitch_index(note.pitch) & 0x07) << 3)
        | ((note.sharp as u8) << 6)
        | ((note.dotted as u8) << 7);
    let second = octave_index(note.octave) & 0x03;
    [first, second]
}
