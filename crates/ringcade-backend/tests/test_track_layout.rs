//! Tests for the track binary layout and timeline computation.

use pretty_assertions::assert_eq;
use ringcade_backend::track::{
    build_timeline, encode_track, TRACK_HEADER_SIZE, TRACK_MAGIC, TRACK_NOTE_SIZE,
};
use ringcade_backend::{encode, BlobFormat};
use ringcade_spec::parse_notation;

// =============================================================================
// Helper Functions
// =============================================================================

fn track_bytes(text: &str) -> Vec<u8> {
    let ringtone = parse_notation(text).unwrap();
    encode_track(&ringtone).unwrap().bytes
}

fn record(bytes: &[u8], name_len: usize, index: usize) -> &[u8] {
    let start = TRACK_HEADER_SIZE + name_len + 1 + index * TRACK_NOTE_SIZE;
    &bytes[start..start + TRACK_NOTE_SIZE]
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_track_worked_example_bytes() {
    let bytes = track_bytes("Test:d=4,o=5,b=160:4c,4p,8e");
    assert_eq!(bytes.len(), 37);
    assert_eq!(&bytes[0..4], TRACK_MAGIC);
    assert_eq!(record(&bytes, 4, 0), &[0x00, 0x00, 0x00, 0x00, 0x77, 0x01, 0x01, 0x00]);
    assert_eq!(record(&bytes, 4, 1), &[0xEE, 0x02, 0x00, 0x00, 0xBB, 0x00, 0x01, 0x00]);
}

#[test]
fn test_track_empty_name_still_terminated() {
    let bytes = track_bytes(":d=4,o=5,b=160:c");
    assert_eq!(bytes[5], 0);
    assert_eq!(bytes[TRACK_HEADER_SIZE], 0);
    assert_eq!(bytes.len(), TRACK_HEADER_SIZE + 1 + TRACK_NOTE_SIZE);
}

#[test]
fn test_track_rests_only() {
    let bytes = track_bytes("Silence:d=4,o=5,b=120:p,p");
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 0);
    assert_eq!(
        u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        1000
    );
    assert_eq!(bytes.len(), TRACK_HEADER_SIZE + "Silence".len() + 1);
}

#[test]
fn test_track_lanes_follow_octave() {
    let bytes = track_bytes("L:d=4,o=5,b=120:c4,c5,c6,c7");
    let lanes: Vec<u8> = (0..4).map(|i| record(&bytes, 1, i)[6]).collect();
    assert_eq!(lanes, vec![0, 1, 2, 2]);
}

#[test]
fn test_track_low_bpm_clamped_in_header() {
    let mut ringtone = parse_notation("Slow:d=4,o=5,b=160:c").unwrap();
    ringtone.defaults.bpm = 0;
    let bytes = encode_track(&ringtone).unwrap().bytes;
    assert_eq!(u16::from_le_bytes([bytes[12], bytes[13]]), 1);
}

// =============================================================================
// Timeline Tests
// =============================================================================

#[test]
fn test_timeline_dotted_notes() {
    let ringtone = parse_notation("Dot:d=4,o=5,b=160:4c.,8d.,e").unwrap();
    let timeline = build_timeline(&ringtone).unwrap();
    let starts: Vec<u32> = timeline.notes.iter().map(|n| n.start_ms).collect();
    let lengths: Vec<u32> = timeline.notes.iter().map(|n| n.duration_ms).collect();
    assert_eq!(lengths, vec![563, 281, 375]);
    assert_eq!(starts, vec![0, 563, 844]);
    assert_eq!(timeline.total_ms, 1219);
}

#[test]
fn test_encode_produces_both_formats() {
    let ringtone = parse_notation("Both:d=8,o=6,b=200:c,d,e").unwrap();
    let encodings = encode(&ringtone).unwrap();
    assert_eq!(encodings.compact.format, BlobFormat::Compact);
    assert_eq!(encodings.track.format, BlobFormat::Track);
    assert_eq!(encodings.track.byte_len(), TRACK_HEADER_SIZE + 5 + 3 * TRACK_NOTE_SIZE);
}
