//! Track timeline encoder for rhythm gameplay.
//!
//! The track form lists every sounding note with an absolute start time in
//! milliseconds and a lane derived from its octave. Rests advance the
//! timeline but produce no record.

use byteorder::{LittleEndian, WriteBytesExt};
use ringcade_spec::{NoteToken, Ringtone};
use std::io::{self, Write};

use crate::blob::{BlobFormat, EncodedBlob};
use crate::error::EncodeError;
use crate::tables::ascii_name;

/// Track file magic identifier.
pub const TRACK_MAGIC: &[u8; 4] = b"BPHR";

/// Track format version.
pub const TRACK_VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const TRACK_HEADER_SIZE: usize = 16;

/// Bytes per note record.
pub const TRACK_NOTE_SIZE: usize = 8;

/// Maximum name length stored in the name block.
pub const TRACK_MAX_NAME_LEN: usize = 63;

/// Largest note count the header can hold.
pub const TRACK_MAX_NOTES: usize = u16::MAX as usize;

/// Tempo range stored in the header.
pub const TRACK_BPM_RANGE: (u32, u32) = (1, 1000);

/// Number of gameplay lanes.
pub const LANE_COUNT: usize = 3;

/// Maps an octave to a lane: 0 for octave 4 and below, 1 for 5, 2 above.
pub fn lane_for_octave(octave: u32) -> u8 {
    match octave {
        0..=4 => 0,
        5 => 1,
        _ => 2,
    }
}

/// Length of a whole note in milliseconds: `round(240000 / bpm)`.
///
/// A zero tempo is treated as 1 bpm.
pub fn whole_note_ms(bpm: u32) -> u32 {
    let bpm = bpm.max(1) as u64;
    ((480_000 + bpm) / (2 * bpm)) as u32
}

/// Length of one token in milliseconds given the whole-note length.
///
/// Integer division by the denominator, then `round(x * 1.5)` if dotted.
pub fn note_length_ms(note: &NoteToken, whole_ms: u32) -> u32 {
    let raw = whole_ms / note.duration.max(1);
    if note.dotted {
        (raw * 3 + 1) / 2
    } else {
        raw
    }
}

/// One scheduled note. Never built from a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackNote {
    /// Start time from the beginning of the song.
    pub start_ms: u32,
    /// Note length. Records store at most `u16::MAX`.
    pub duration_ms: u32,
    /// Gameplay lane (0..=2).
    pub lane: u8,
    /// Reserved, always 0.
    pub flags: u8,
}

impl TrackNote {
    /// Write the 8-byte record.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.start_ms)?;
        writer.write_u16::<LittleEndian>(self.duration_ms.min(u16::MAX as u32) as u16)?;
        writer.write_u8(self.lane)?;
        writer.write_u8(self.flags)?;
        Ok(())
    }
}

/// Absolute timing for a whole ringtone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    /// Sounding notes in source order.
    pub notes: Vec<TrackNote>,
    /// Final cursor value: total song length including trailing rests.
    pub total_ms: u32,
    /// Tempo used for timing (not clamped).
    pub bpm: u32,
}

impl Timeline {
    /// Counts sounding notes per lane.
    pub fn lane_counts(&self) -> [usize; LANE_COUNT] {
        let mut counts = [0; LANE_COUNT];
        for note in &self.notes {
            counts[note.lane as usize] += 1;
        }
        counts
    }
}

/// Computes the timeline of a parsed ringtone.
///
/// # Errors
/// Returns [`EncodeError::TimelineOverflow`] if any time exceeds `u32`.
pub fn build_timeline(ringtone: &Ringtone) -> Result<Timeline, EncodeError> {
    let whole_ms = whole_note_ms(ringtone.defaults.bpm);
    let mut elapsed: u64 = 0;
    let mut notes = Vec::with_capacity(ringtone.sounding_count());

    for token in &ringtone.notes {
        let length = note_length_ms(token, whole_ms);
        if !token.is_rest() {
            notes.push(TrackNote {
                start_ms: to_ms(elapsed)?,
                duration_ms: length,
                lane: lane_for_octave(token.octave),
                flags: 0,
            });
        }
        elapsed += length as u64;
    }

    Ok(Timeline {
        notes,
        total_ms: to_ms(elapsed)?,
        bpm: ringtone.defaults.bpm,
    })
}

fn to_ms(elapsed: u64) -> Result<u32, EncodeError> {
    u32::try_from(elapsed).map_err(|_| EncodeError::TimelineOverflow { total_ms: elapsed })
}

/// Track header data.
#[derive(Debug, Clone)]
pub struct TrackHeader {
    /// Song name (ASCII, at most 63 bytes).
    pub name: Vec<u8>,
    /// Number of note records.
    pub note_count: u16,
    /// Song length in milliseconds.
    pub total_ms: u32,
    /// Tempo, clamped to 1..=1000.
    pub bpm: u16,
}

impl TrackHeader {
    /// Create a header for a timeline.
    ///
    /// # Errors
    /// Returns [`EncodeError::TooManyNotes`] if the note count does not fit.
    pub fn new(name: &str, timeline: &Timeline) -> Result<Self, EncodeError> {
        let note_count =
            u16::try_from(timeline.notes.len()).map_err(|_| EncodeError::TooManyNotes {
                count: timeline.notes.len(),
                max: TRACK_MAX_NOTES,
            })?;
        let (min_bpm, max_bpm) = TRACK_BPM_RANGE;
        Ok(Self {
            name: ascii_name(name, TRACK_MAX_NAME_LEN),
            note_count,
            total_ms: timeline.total_ms,
            bpm: timeline.bpm.clamp(min_bpm, max_bpm) as u16,
        })
    }

    /// Bytes used by the header and the NUL-terminated name block.
    pub fn encoded_len(&self) -> usize {
        TRACK_HEADER_SIZE + self.name.len() + 1
    }

    /// Write the header followed by the name block.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(TRACK_MAGIC)?;
        writer.write_u8(TRACK_VERSION)?;
        writer.write_u8(self.name.len() as u8)?;
        writer.write_u16::<LittleEndian>(self.note_count)?;
        writer.write_u32::<LittleEndian>(self.total_ms)?;
        writer.write_u16::<LittleEndian>(self.bpm)?;

        // Reserved
        writer.write_u16::<LittleEndian>(0)?;

        writer.write_all(&self.name)?;
        writer.write_u8(0)?;

        Ok(())
    }
}

/// Encodes a parsed ringtone into the track form.
///
/// # Example
/// ```
/// use ringcade_backend::track::encode_track;
/// use ringcade_spec::parse_notation;
///
/// let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
/// let blob = encode_track(&ringtone).unwrap();
/// assert_eq!(blob.byte_len(), 37);
/// assert_eq!(&blob.as_bytes()[0..4], b"BPHR");
/// ```
pub fn encode_track(ringtone: &Ringtone) -> Result<EncodedBlob, EncodeError> {
    let timeline = build_timeline(ringtone)?;
    let header = TrackHeader::new(&ringtone.name, &timeline)?;

    let mut bytes = Vec::with_capacity(header.encoded_len() + TRACK_NOTE_SIZE * timeline.notes.len());
    header.write(&mut bytes)?;
    for note in &timeline.notes {
        note.write(&mut bytes)?;
    }

    Ok(EncodedBlob::new(BlobFormat::Track, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ringcade_spec::{parse_notation, Pitch};

    fn token(duration: u32, dotted: bool) -> NoteToken {
        NoteToken {
            duration,
            pitch: Pitch::C,
            sharp: false,
            octave: 5,
            dotted,
        }
    }

    #[test]
    fn test_lane_for_octave() {
        assert_eq!(lane_for_octave(0), 0);
        assert_eq!(lane_for_octave(4), 0);
        assert_eq!(lane_for_octave(5), 1);
        assert_eq!(lane_for_octave(6), 2);
        assert_eq!(lane_for_octave(8), 2);
        assert_eq!(lane_for_octave(u32::MAX), 2);
    }

    #[test]
    fn test_whole_note_ms_rounds() {
        assert_eq!(whole_note_ms(160), 1500);
        assert_eq!(whole_note_ms(120), 2000);
        // 240000 / 90 = 2666.67
        assert_eq!(whole_note_ms(90), 2667);
        // 240000 / 140 = 1714.29
        assert_eq!(whole_note_ms(140), 1714);
        assert_eq!(whole_note_ms(0), 240_000);
        assert_eq!(whole_note_ms(1), 240_000);
    }

    #[test]
    fn test_note_length_ms() {
        assert_eq!(note_length_ms(&token(4, false), 1500), 375);
        assert_eq!(note_length_ms(&token(8, false), 1500), 187);
        // 375 * 1.5 = 562.5 rounds up
        assert_eq!(note_length_ms(&token(4, true), 1500), 563);
        assert_eq!(note_length_ms(&token(8, true), 1500), 281);
        assert_eq!(note_length_ms(&token(0, false), 1500), 1500);
    }

    #[test]
    fn test_timeline_worked_example() {
        let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
        let timeline = build_timeline(&ringtone).unwrap();
        assert_eq!(
            timeline.notes,
            vec![
                TrackNote {
                    start_ms: 0,
                    duration_ms: 375,
                    lane: 1,
                    flags: 0
                },
                TrackNote {
                    start_ms: 750,
                    duration_ms: 187,
                    lane: 1,
                    flags: 0
                },
            ]
        );
        assert_eq!(timeline.total_ms, 937);
        assert_eq!(timeline.lane_counts(), [0, 2, 0]);
    }

    #[test]
    fn test_trailing_rest_extends_total() {
        let ringtone = parse_notation("T:d=4,o=5,b=120:c,2p").unwrap();
        let timeline = build_timeline(&ringtone).unwrap();
        assert_eq!(timeline.notes.len(), 1);
        assert_eq!(timeline.total_ms, 500 + 1000);
    }

    #[test]
    fn test_zero_tempo_and_duration_are_clamped() {
        let ringtone = parse_notation("T:d=4,o=5,b=0:c").unwrap();
        let timeline = build_timeline(&ringtone).unwrap();
        assert_eq!(timeline.notes[0].duration_ms, 60_000);
        assert_eq!(timeline.total_ms, 60_000);
        assert_eq!(TrackHeader::new("T", &timeline).unwrap().bpm, 1);

        let ringtone = parse_notation("T:d=0,o=5,b=160:c,8d").unwrap();
        let timeline = build_timeline(&ringtone).unwrap();
        assert_eq!(timeline.notes[0].duration_ms, 1500);
        assert_eq!(timeline.notes[1].start_ms, 1500);
        assert_eq!(timeline.total_ms, 1500 + 187);
    }

    #[test]
    fn test_header_clamps_bpm_and_name() {
        let long_name = "x".repeat(100);
        let timeline = Timeline {
            notes: Vec::new(),
            total_ms: 0,
            bpm: 5000,
        };
        let header = TrackHeader::new(&long_name, &timeline).unwrap();
        assert_eq!(header.bpm, 1000);
        assert_eq!(header.name.len(), TRACK_MAX_NAME_LEN);
        assert_eq!(header.encoded_len(), TRACK_HEADER_SIZE + 63 + 1);
    }

    #[test]
    fn test_header_rejects_too_many_notes() {
        let note = TrackNote {
            start_ms: 0,
            duration_ms: 1,
            lane: 0,
            flags: 0,
        };
        let timeline = Timeline {
            notes: vec![note; TRACK_MAX_NOTES + 1],
            total_ms: 0,
            bpm: 120,
        };
        let err = TrackHeader::new("big", &timeline).unwrap_err();
        assert!(matches!(err, EncodeError::TooManyNotes { count, .. } if count == 65536));
    }

    #[test]
    fn test_long_note_saturates_in_record() {
        let note = TrackNote {
            start_ms: 0,
            duration_ms: 240_000,
            lane: 1,
            flags: 0,
        };
        let mut bytes = Vec::new();
        note.write(&mut bytes).unwrap();
        assert_eq!(&bytes[4..6], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_header_layout() {
        let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
        let blob = encode_track(&ringtone).unwrap();
        let bytes = blob.as_bytes();
        assert_eq!(&bytes[0..4], TRACK_MAGIC);
        assert_eq!(bytes[4], TRACK_VERSION);
        assert_eq!(bytes[5], 4);
        assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 2);
        assert_eq!(
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            937
        );
        assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 160);
        assert_eq!(&bytes[14..16], &[0, 0]);
        assert_eq!(&bytes[16..21], &[0x54, 0x65, 0x73, 0x74, 0x00]);
    }
}
