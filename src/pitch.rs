//! Pitch Model
//!
//! Note-name parsing and lossless conversion between notes and a totally
//! ordered semitone space (`index + 12 * octave`, so `C0` is semitone 0).

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of pitch classes in an octave.
pub const SEMITONES: usize = 12;

/// Canonical spellings, sharps only, in semitone order.
const NAMES: [&str; SEMITONES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const PITCH_CLASSES: [PitchClass; SEMITONES] = [
    PitchClass::C,
    PitchClass::Cs,
    PitchClass::D,
    PitchClass::Ds,
    PitchClass::E,
    PitchClass::F,
    PitchClass::Fs,
    PitchClass::G,
    PitchClass::Gs,
    PitchClass::A,
    PitchClass::As,
    PitchClass::B,
];

/// Errors raised while parsing or converting pitches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    /// Text is not `<pitch class><octave>`: the octave digits are missing or
    /// out of range, or the prefix is not one of the twelve spellings.
    #[error("invalid note `{text}`: {reason}")]
    InvalidNoteFormat {
        /// The rejected input.
        text: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Semitone has no note representation (negative, or octave above 255).
    #[error("semitone {0} cannot be named")]
    InvalidSemitone(i32),
}

/// Twelve chromatic pitch classes, spelled with sharps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PitchClass {
    /// C
    C,
    /// C sharp
    Cs,
    /// D
    D,
    /// D sharp
    Ds,
    /// E
    E,
    /// F
    F,
    /// F sharp
    Fs,
    /// G
    G,
    /// G sharp
    Gs,
    /// A
    A,
    /// A sharp
    As,
    /// B
    B,
}

impl PitchClass {
    /// All pitch classes in ascending order, starting at C.
    pub const ALL: [PitchClass; SEMITONES] = PITCH_CLASSES;

    /// Pitch class for a semitone index; any integer is reduced mod 12.
    pub const fn from_index(idx: i32) -> PitchClass {
        PITCH_CLASSES[idx.rem_euclid(SEMITONES as i32) as usize]
    }

    /// Position of this pitch class within the octave (C = 0, B = 11).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical spelling, e.g. `"F#"`.
    pub const fn name(self) -> &'static str {
        NAMES[self as usize]
    }
}

impl Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .position(|&n| n == s)
            .map(|i| PITCH_CLASSES[i])
            .ok_or_else(|| PitchError::InvalidNoteFormat {
                text: s.to_string(),
                reason: "unrecognized pitch class",
            })
    }
}

impl TryFrom<String> for PitchClass {
    type Error = PitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PitchClass> for String {
    fn from(pc: PitchClass) -> Self {
        pc.name().to_string()
    }
}

/// A pitch class in a specific octave.
///
/// Ordering follows the semitone index, so `B2 < C3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    /// Pitch class of the note.
    pub pitch_class: PitchClass,
    /// Octave number; `C0` is the lowest representable note.
    pub octave: u8,
}

impl Note {
    /// Create a note from its parts.
    pub const fn new(pitch_class: PitchClass, octave: u8) -> Self {
        Note {
            pitch_class,
            octave,
        }
    }

    /// Absolute semitone index of this note.
    pub const fn semitone(self) -> i32 {
        note_to_semitone(self)
    }

    /// The note `interval` semitones away.
    pub fn transpose(self, interval: i32) -> Result<Note, PitchError> {
        semitone_to_note(self.semitone() + interval)
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.semitone().cmp(&other.semitone())
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

impl FromStr for Note {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_note(s)
    }
}

impl TryFrom<String> for Note {
    type Error = PitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_note(&value)
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

/// A set of pitch classes, iterated in ascending index order (C first).
///
/// Octave information is discarded; inserting a pitch class twice is a no-op.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PitchClass>", into = "Vec<PitchClass>")]
pub struct PitchClassSet {
    bits: u16,
}

impl PitchClassSet {
    /// An empty set.
    pub const fn new() -> Self {
        PitchClassSet { bits: 0 }
    }

    /// Add a pitch class. Returns `true` if it was not already present.
    pub fn insert(&mut self, pc: PitchClass) -> bool {
        let was_absent = !self.contains(pc);
        self.bits |= 1u16 << pc.index();
        was_absent
    }

    /// Whether `pc` is a member.
    pub const fn contains(&self, pc: PitchClass) -> bool {
        self.bits & (1u16 << pc.index()) != 0
    }

    /// Number of distinct pitch classes.
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether the set has no members.
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Whether every member of `self` is also in `other`.
    pub const fn is_subset(&self, other: &PitchClassSet) -> bool {
        self.bits & !other.bits == 0
    }

    /// Members in ascending pitch-class order.
    pub fn iter(&self) -> impl Iterator<Item = PitchClass> + '_ {
        PitchClass::ALL.into_iter().filter(|&pc| self.contains(pc))
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        let mut set = PitchClassSet::new();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

impl Extend<PitchClass> for PitchClassSet {
    fn extend<I: IntoIterator<Item = PitchClass>>(&mut self, iter: I) {
        for pc in iter {
            self.insert(pc);
        }
    }
}

impl From<Vec<PitchClass>> for PitchClassSet {
    fn from(v: Vec<PitchClass>) -> Self {
        v.into_iter().collect()
    }
}

impl From<PitchClassSet> for Vec<PitchClass> {
    fn from(set: PitchClassSet) -> Self {
        set.iter().collect()
    }
}

impl Display for PitchClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, pc) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{pc}")?;
        }
        f.write_str("}")
    }
}

/// Parse text such as `"E2"` or `"C#4"`.
///
/// The input is split at its first digit: the prefix must be a canonical
/// spelling and the remainder must be an octave in `0..=255`.
pub fn parse_note(text: &str) -> Result<Note, PitchError> {
    let invalid = |reason| PitchError::InvalidNoteFormat {
        text: text.to_string(),
        reason,
    };

    let split = text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| invalid("missing octave"))?;
    let (name, octave) = text.split_at(split);

    let pitch_class = name
        .parse::<PitchClass>()
        .map_err(|_| invalid("unrecognized pitch class"))?;
    if !octave.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("octave must be digits only"));
    }
    let octave = octave
        .parse::<u8>()
        .map_err(|_| invalid("octave out of range"))?;

    Ok(Note::new(pitch_class, octave))
}

/// `index(pitch_class) + 12 * octave`.
pub const fn note_to_semitone(note: Note) -> i32 {
    note.pitch_class.index() as i32 + SEMITONES as i32 * note.octave as i32
}

/// Inverse of [`note_to_semitone`].
///
/// Negative semitones are rejected rather than given a negative octave.
pub fn semitone_to_note(semitone: i32) -> Result<Note, PitchError> {
    if semitone < 0 {
        return Err(PitchError::InvalidSemitone(semitone));
    }
    let octave = u8::try_from(semitone / SEMITONES as i32)
        .map_err(|_| PitchError::InvalidSemitone(semitone))?;
    Ok(Note::new(PitchClass::from_index(semitone), octave))
}
