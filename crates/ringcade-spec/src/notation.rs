//! Ring-tone notation model and parser.
//!
//! A notation string has three colon-separated sections:
//!
//! ```text
//! Test:d=4,o=5,b=160:4c,4p,8e
//! ^^^^ ^^^^^^^^^^^^^ ^^^^^^^^
//! name defaults      notes
//! ```
//!
//! Parsing is permissive below the section level. A malformed default or
//! note field falls back to the value in scope and is recorded as a
//! [`FieldWarning`]; only a missing section is a hard [`ParseError`].

use serde::Serialize;

use crate::error::{FieldWarning, ParseError, WarningCode};

/// Built-in default note-length denominator (quarter note).
pub const DEFAULT_DURATION: u32 = 4;

/// Built-in default octave.
pub const DEFAULT_OCTAVE: u32 = 5;

/// Built-in default tempo in beats per minute.
pub const DEFAULT_BPM: u32 = 160;

/// Display name used when the text has no colon at all.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Section-wide values applied to notes that omit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Defaults {
    /// Note-length denominator (4 = quarter note). Zero is kept and timed
    /// as a whole note.
    pub duration: u32,
    /// Octave.
    pub octave: u32,
    /// Beats per minute. Zero is kept and timed as 1 bpm.
    pub bpm: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            octave: DEFAULT_OCTAVE,
            bpm: DEFAULT_BPM,
        }
    }
}

/// Pitch class of a note, or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pitch {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
    Rest,
}

impl Pitch {
    /// Parses a pitch letter (case-insensitive). `p` is the rest marker.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'c' => Some(Pitch::C),
            'd' => Some(Pitch::D),
            'e' => Some(Pitch::E),
            'f' => Some(Pitch::F),
            'g' => Some(Pitch::G),
            'a' => Some(Pitch::A),
            'b' => Some(Pitch::B),
            'p' => Some(Pitch::Rest),
            _ => None,
        }
    }

    /// Returns the lowercase notation letter.
    pub fn letter(&self) -> char {
        match self {
            Pitch::C => 'c',
            Pitch::D => 'd',
            Pitch::E => 'e',
            Pitch::F => 'f',
            Pitch::G => 'g',
            Pitch::A => 'a',
            Pitch::B => 'b',
            Pitch::Rest => 'p',
        }
    }

    /// Returns true for the rest marker.
    pub fn is_rest(&self) -> bool {
        matches!(self, Pitch::Rest)
    }
}

/// One parsed note with every field resolved against [`Defaults`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteToken {
    /// Note-length denominator.
    pub duration: u32,
    /// Pitch class or rest.
    pub pitch: Pitch,
    /// Raised by a semitone.
    pub sharp: bool,
    /// Octave.
    pub octave: u32,
    /// Length extended by half.
    pub dotted: bool,
}

impl NoteToken {
    /// Returns true if this token is a rest.
    pub fn is_rest(&self) -> bool {
        self.pitch.is_rest()
    }
}

impl std::fmt::Display for NoteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.duration, self.pitch.letter())?;
        if self.sharp {
            write!(f, "#")?;
        }
        if !self.is_rest() {
            write!(f, "{}", self.octave)?;
        }
        if self.dotted {
            write!(f, ".")?;
        }
        Ok(())
    }
}

/// Parser output: everything both encoders need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ringtone {
    /// Display name (trimmed name section).
    pub name: String,
    /// Defaults section values.
    pub defaults: Defaults,
    /// Notes in source order, rests included.
    pub notes: Vec<NoteToken>,
    /// Field problems that were recovered from.
    pub warnings: Vec<FieldWarning>,
}

impl Ringtone {
    /// Number of tokens that produce sound.
    pub fn sounding_count(&self) -> usize {
        self.notes.iter().filter(|n| !n.is_rest()).count()
    }
}

/// Returns the display name of a notation text.
///
/// This is the trimmed substring before the first colon, or
/// [`UNKNOWN_NAME`] if the text has no colon.
pub fn display_name_of(text: &str) -> String {
    text.split_once(':')
        .map(|(name, _)| name.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Parses a notation string.
///
/// # Errors
/// Returns [`ParseError::MissingSections`] if the text does not contain
/// the name, defaults, and notes sections.
///
/// # Example
/// ```
/// use ringcade_spec::notation::{parse_notation, Pitch};
///
/// let ringtone = parse_notation("Test:d=4,o=5,b=160:4c,4p,8e").unwrap();
/// assert_eq!(ringtone.name, "Test");
/// assert_eq!(ringtone.notes.len(), 3);
/// assert_eq!(ringtone.notes[1].pitch, Pitch::Rest);
/// assert_eq!(ringtone.notes[2].duration, 8);
/// ```
pub fn parse_notation(text: &str) -> Result<Ringtone, ParseError> {
    let sections: Vec<&str> = text.trim().splitn(3, ':').collect();
    if sections.len() < 3 {
        return Err(ParseError::MissingSections {
            found: sections.len(),
        });
    }

    let mut warnings = Vec::new();
    let defaults = parse_defaults(sections[1], &mut warnings);

    let notes = sections[2]
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| parse_note(token, &defaults, index, &mut warnings))
        .collect();

    Ok(Ringtone {
        name: sections[0].trim().to_string(),
        defaults,
        notes,
        warnings,
    })
}

/// Parses the `key=value` defaults section.
fn parse_defaults(section: &str, warnings: &mut Vec<FieldWarning>) -> Defaults {
    let mut defaults = Defaults::default();

    for (index, entry) in section.split(',').map(str::trim).enumerate() {
        if entry.is_empty() {
            continue;
        }
        let location = format!("defaults[{}]", index);

        let Some((key, value)) = entry.split_once('=') else {
            warnings.push(FieldWarning::with_location(
                WarningCode::MalformedDefault,
                format!("expected `key=value`, found `{}`", entry),
                location,
            ));
            continue;
        };

        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        let slot = match key.as_str() {
            "d" => &mut defaults.duration,
            "o" => &mut defaults.octave,
            "b" => &mut defaults.bpm,
            _ => {
                warnings.push(FieldWarning::with_location(
                    WarningCode::UnknownDefaultKey,
                    format!("unknown default key `{}`", key),
                    location,
                ));
                continue;
            }
        };

        match value.parse::<u32>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => warnings.push(FieldWarning::with_location(
                WarningCode::MalformedDefault,
                format!("invalid value `{}` for `{}`, keeping {}", value, key, slot),
                location,
            )),
        }
    }

    defaults
}

/// Left-to-right view over the characters of a note token.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(token: &'a str) -> Self {
        Self { rest: token }
    }

    /// Consumes a run of ASCII digits.
    fn take_digits(&mut self) -> Option<&'a str> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(digits)
    }

    /// Consumes one character if it maps to a value.
    fn take_map<T>(&mut self, f: impl FnOnce(char) -> Option<T>) -> Option<T> {
        let c = self.rest.chars().next()?;
        let value = f(c)?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(value)
    }

    /// Consumes one specific character.
    fn take_char(&mut self, expected: char) -> bool {
        self.take_map(|c| (c == expected).then_some(())).is_some()
    }
}

/// Parses one note token. Never fails; see module docs.
fn parse_note(
    token: &str,
    defaults: &Defaults,
    index: usize,
    warnings: &mut Vec<FieldWarning>,
) -> NoteToken {
    let location = || format!("notes[{}]", index);
    let mut cursor = Cursor::new(token);

    let duration = match cursor.take_digits() {
        Some(digits) => match digits.parse::<u32>() {
            Ok(value) => value,
            Err(_) => {
                warnings.push(FieldWarning::with_location(
                    WarningCode::MalformedNoteField,
                    format!(
                        "invalid duration `{}` in `{}`, using {}",
                        digits, token, defaults.duration
                    ),
                    location(),
                ));
                defaults.duration
            }
        },
        None => defaults.duration,
    };

    let pitch = cursor.take_map(Pitch::from_letter).unwrap_or_else(|| {
        warnings.push(FieldWarning::with_location(
            WarningCode::MissingPitch,
            format!("no pitch letter in `{}`, treating as rest", token),
            location(),
        ));
        Pitch::Rest
    });

    let sharp = cursor.take_char('#');

    let octave = match cursor.take_digits() {
        Some(digits) => digits.parse::<u32>().unwrap_or_else(|_| {
            warnings.push(FieldWarning::with_location(
                WarningCode::MalformedNoteField,
                format!(
                    "invalid octave `{}` in `{}`, using {}",
                    digits, token, defaults.octave
                ),
                location(),
            ));
            defaults.octave
        }),
        None => defaults.octave,
    };

    let dotted = cursor.take_char('.');

    if !cursor.rest.is_empty() {
        warnings.push(FieldWarning::with_location(
            WarningCode::TrailingCharacters,
            format!("dropped `{}` after `{}`", cursor.rest, token),
            location(),
        ));
    }

    NoteToken {
        duration,
        pitch,
        sharp,
        octave,
        dotted,
    }
}
