//! Voicing Analyzer
//!
//! A voicing is one fret-or-mute value per string. This module derives the
//! harmonic content and a root note from a voicing, enumerates voicings that
//! sound a target set of pitch classes, and implements the textual voicing
//! codec (`"x32010"`, or `"x-3-5-5-10-x"` once frets reach two digits).

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::{FretValue, Fretboard, FretboardError};
use crate::pitch::{Note, PitchClass, PitchClassSet};

/// Errors raised while decoding or analyzing voicings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoicingError {
    /// A token was neither a fret number nor `x`/`X`.
    #[error("invalid fret `{0}` in voicing")]
    InvalidFret(String),

    /// The voicing text contained no strings.
    #[error("voicing is empty")]
    Empty,

    /// The voicing does not have one value per tuned string.
    #[error("voicing has {got} strings, tuning has {expected}")]
    LengthMismatch {
        /// Number of strings in the tuning.
        expected: usize,
        /// Number of values in the voicing.
        got: usize,
    },

    /// A string could not be resolved.
    #[error(transparent)]
    Fretboard(#[from] FretboardError),
}

/// One fret-or-mute value per string, lowest string first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Voicing(Vec<FretValue>);

impl Voicing {
    /// Wrap per-string values, lowest string first.
    pub fn new(frets: Vec<FretValue>) -> Self {
        Voicing(frets)
    }

    /// Per-string values, lowest string first.
    pub fn frets(&self) -> &[FretValue] {
        &self.0
    }

    /// Number of strings covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the voicing covers no strings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every string is muted.
    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|f| f.is_muted())
    }
}

impl FromStr for Voicing {
    type Err = VoicingError;

    /// Accepts the compact form (`"x32010"`, one character per string) or a
    /// form separated by `-`, `,` or whitespace (`"x 3 5 5 10 x"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let separated = s.contains(|c: char| c == '-' || c == ',' || c.is_whitespace());

        let frets = if separated {
            s.split(|c: char| c == '-' || c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(parse_fret)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            s.char_indices()
                .map(|(i, c)| parse_fret(&s[i..i + c.len_utf8()]))
                .collect::<Result<Vec<_>, _>>()?
        };

        if frets.is_empty() {
            return Err(VoicingError::Empty);
        }
        Ok(Voicing(frets))
    }
}

fn parse_fret(token: &str) -> Result<FretValue, VoicingError> {
    if token.eq_ignore_ascii_case("x") {
        return Ok(FretValue::Muted);
    }
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VoicingError::InvalidFret(token.to_string()));
    }
    token
        .parse::<u8>()
        .map(FretValue::Fret)
        .map_err(|_| VoicingError::InvalidFret(token.to_string()))
}

impl Display for Voicing {
    /// Compact when every fret is a single digit, `-`-separated otherwise.
    ///
    /// A lone two-digit fret gets a trailing `-` (`"10-"`) so it still reads
    /// back as one string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let compact = self.0.iter().all(|v| matches!(v.fret(), None | Some(0..=9)));
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 && !compact {
                f.write_str("-")?;
            }
            write!(f, "{v}")?;
        }
        if !compact && self.0.len() == 1 {
            f.write_str("-")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Voicing {
    type Error = VoicingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Voicing> for String {
    fn from(v: Voicing) -> Self {
        v.to_string()
    }
}

/// Canonical text for a voicing string: decode, then encode.
pub fn normalize(text: &str) -> Result<String, VoicingError> {
    Ok(text.parse::<Voicing>()?.to_string())
}

fn check_length(voicing: &Voicing, fretboard: &Fretboard) -> Result<(), VoicingError> {
    let expected = fretboard.tuning().len();
    if voicing.len() != expected {
        return Err(VoicingError::LengthMismatch {
            expected,
            got: voicing.len(),
        });
    }
    Ok(())
}

/// Resolve every string; muted strings yield `None`.
pub fn sounding_notes(
    voicing: &Voicing,
    fretboard: &Fretboard,
) -> Result<Vec<Option<Note>>, VoicingError> {
    check_length(voicing, fretboard)?;
    fretboard
        .tuning()
        .strings()
        .iter()
        .zip(voicing.frets())
        .map(|(&open, &fret)| Ok(fretboard.resolve(open, fret)?))
        .collect()
}

/// Distinct pitch classes sounded by `voicing`.
pub fn notes_in(voicing: &Voicing, fretboard: &Fretboard) -> Result<PitchClassSet, VoicingError> {
    Ok(sounding_notes(voicing, fretboard)?
        .into_iter()
        .flatten()
        .map(|n| n.pitch_class)
        .collect())
}

/// Root note of `voicing`, by heuristic.
///
/// Scanning strings from low to high: the first open string gives the root;
/// failing that, the first string that sounds at all; an all-muted voicing
/// has no root.
///
/// This is a heuristic, not music-theoretic root detection. It does not
/// consider inversions or bass-note theory beyond "lowest sounding open
/// string wins", so `x32010` (C major) reports `G` from its open G string.
pub fn root_of(voicing: &Voicing, fretboard: &Fretboard) -> Result<Option<PitchClass>, VoicingError> {
    let notes = sounding_notes(voicing, fretboard)?;
    let strings = voicing.frets().iter().zip(&notes);

    let open = strings
        .clone()
        .find(|(fret, _)| fret.is_open())
        .and_then(|(_, note)| *note);
    let root = open.or_else(|| strings.filter_map(|(_, note)| *note).next());
    Ok(root.map(|n| n.pitch_class))
}

/// Whether `voicing` sounds exactly the pitch classes in `chord`.
pub fn realizes(
    voicing: &Voicing,
    chord: &PitchClassSet,
    fretboard: &Fretboard,
) -> Result<bool, VoicingError> {
    Ok(notes_in(voicing, fretboard)? == *chord)
}

/// Every voicing that sounds exactly `targets` within the hand limits of
/// `fretboard`.
///
/// Candidates per string come from [`Fretboard::positions_for`]. A voicing is
/// kept when it covers every target, its fretted (non-open) strings lie
/// within a `fret_span`-fret window, and no more than `max_fingers` strings
/// are fretted. Barres are not modelled, so each fretted string counts as a
/// finger. Output is ordered lexicographically by the candidate lists, the
/// lowest string varying slowest.
///
/// Partial voicings are abandoned as soon as they break a hand limit or can
/// no longer reach every target with the strings left.
pub fn voicings_for(
    targets: &PitchClassSet,
    fretboard: &Fretboard,
) -> Result<Vec<Voicing>, VoicingError> {
    let strings = fretboard.tuning().strings();
    if targets.is_empty() || targets.len() > strings.len() {
        debug!(
            targets = %targets,
            strings = strings.len(),
            "no voicing can sound these targets"
        );
        return Ok(Vec::new());
    }

    let mut candidates = Vec::with_capacity(strings.len());
    for &open in strings {
        let mut options = Vec::new();
        for fret in fretboard.positions_for(open, targets)? {
            let pitch_class = fretboard.resolve(open, fret)?.map(|n| n.pitch_class);
            options.push((fret, pitch_class));
        }
        candidates.push(options);
    }

    let mut search = Search {
        targets: *targets,
        candidates: &candidates,
        fret_span: fretboard.fret_span(),
        max_fingers: fretboard.max_fingers(),
        current: Vec::with_capacity(strings.len()),
        found: Vec::new(),
        visited: 0,
    };
    search.descend(Hand::default());

    debug!(
        targets = %targets,
        visited = search.visited,
        found = search.found.len(),
        "voicing enumeration finished"
    );
    Ok(search.found)
}

/// What the fretting hand is doing so far.
#[derive(Clone, Copy, Default)]
struct Hand {
    covered: PitchClassSet,
    fingers: u8,
    lowest: Option<u8>,
    highest: u8,
}

impl Hand {
    /// `None` when the next string breaks the finger count or fret window.
    fn place(
        self,
        fret: FretValue,
        pitch_class: Option<PitchClass>,
        fret_span: u8,
        max_fingers: u8,
    ) -> Option<Hand> {
        let mut next = self;
        if let Some(pc) = pitch_class {
            next.covered.insert(pc);
        }
        if let FretValue::Fret(n @ 1..) = fret {
            next.fingers = next.fingers.saturating_add(1);
            if next.fingers > max_fingers {
                return None;
            }
            let lowest = next.lowest.map_or(n, |lo| lo.min(n));
            let highest = next.highest.max(n);
            if highest - lowest >= fret_span {
                return None;
            }
            next.lowest = Some(lowest);
            next.highest = highest;
        }
        Some(next)
    }
}

struct Search<'a> {
    targets: PitchClassSet,
    candidates: &'a [Vec<(FretValue, Option<PitchClass>)>],
    fret_span: u8,
    max_fingers: u8,
    current: Vec<FretValue>,
    found: Vec<Voicing>,
    visited: usize,
}

impl Search<'_> {
    fn descend(&mut self, hand: Hand) {
        self.visited += 1;
        let depth = self.current.len();
        if depth == self.candidates.len() {
            if hand.covered == self.targets {
                self.found.push(Voicing(self.current.clone()));
            }
            return;
        }

        // candidates only sound targets, so `covered` is a subset of them
        let missing = self.targets.len() - hand.covered.len();
        if missing > self.candidates.len() - depth {
            return;
        }

        for &(fret, pitch_class) in &self.candidates[depth] {
            let Some(next) = hand.place(fret, pitch_class, self.fret_span, self.max_fingers) else {
                continue;
            };
            self.current.push(fret);
            self.descend(next);
            self.current.pop();
        }
    }
}
