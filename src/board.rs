//! Fretboard Model
//!
//! Resolves (string, fret) positions to notes and searches a string for the
//! frets that sound a target set of pitch classes.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pitch::{parse_note, Note, PitchClass, PitchClassSet, PitchError};

/// Highest fret considered when none is configured.
pub const DEFAULT_MAX_FRET: u8 = 12;

/// Widest hand window (in frets) accepted by voicing enumeration by default.
pub const DEFAULT_FRET_SPAN: u8 = 4;

/// Fretting fingers available to voicing enumeration by default.
pub const DEFAULT_MAX_FINGERS: u8 = 4;

const STANDARD_TUNING: [Note; 6] = [
    Note::new(PitchClass::E, 2),
    Note::new(PitchClass::A, 2),
    Note::new(PitchClass::D, 3),
    Note::new(PitchClass::G, 3),
    Note::new(PitchClass::B, 3),
    Note::new(PitchClass::E, 4),
];
const DROP_D_TUNING: [Note; 6] = [
    Note::new(PitchClass::D, 2),
    Note::new(PitchClass::A, 2),
    Note::new(PitchClass::D, 3),
    Note::new(PitchClass::G, 3),
    Note::new(PitchClass::B, 3),
    Note::new(PitchClass::E, 4),
];

/// Errors raised by fretboard lookups and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FretboardError {
    /// Fret is negative or above the configured maximum.
    #[error("fret {fret} out of range 0..={max}")]
    FretOutOfRange {
        /// The rejected fret.
        fret: i32,
        /// Highest fret allowed by the configuration.
        max: u8,
    },

    /// String index does not exist in the tuning.
    #[error("string {index} out of range for a {strings}-string tuning")]
    StringOutOfRange {
        /// The rejected string index (0 = lowest string).
        index: usize,
        /// Number of strings in the tuning.
        strings: usize,
    },

    /// An error occurred while validating the fretboard configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The resolved pitch could not be represented.
    #[error(transparent)]
    Pitch(#[from] PitchError),
}

/// What a single string plays: a fret number, or nothing at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FretValue {
    /// Fretted (or open, at 0) string.
    Fret(u8),
    /// The string is not played.
    Muted,
}

impl FretValue {
    /// Open string.
    pub const OPEN: FretValue = FretValue::Fret(0);

    /// Fret number, or `None` when muted.
    pub const fn fret(self) -> Option<u8> {
        match self {
            FretValue::Fret(n) => Some(n),
            FretValue::Muted => None,
        }
    }

    /// Whether the string is muted.
    pub const fn is_muted(self) -> bool {
        matches!(self, FretValue::Muted)
    }

    /// Whether the string sounds unfretted.
    pub const fn is_open(self) -> bool {
        matches!(self, FretValue::Fret(0))
    }
}

impl Display for FretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FretValue::Fret(n) => write!(f, "{n}"),
            FretValue::Muted => f.write_str("x"),
        }
    }
}

/// Open-string notes, lowest string first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuning(Vec<Note>);

impl Tuning {
    /// Build a tuning from open-string notes, lowest first.
    pub fn new(strings: Vec<Note>) -> Result<Self, FretboardError> {
        if strings.is_empty() {
            return Err(FretboardError::Configuration(
                "tuning needs at least one string".into(),
            ));
        }
        Ok(Tuning(strings))
    }

    /// `E2 A2 D3 G3 B3 E4`.
    pub fn standard() -> Self {
        Tuning(STANDARD_TUNING.to_vec())
    }

    /// `D2 A2 D3 G3 B3 E4`.
    pub fn drop_d() -> Self {
        Tuning(DROP_D_TUNING.to_vec())
    }

    /// Open-string notes, lowest first.
    pub fn strings(&self) -> &[Note] {
        &self.0
    }

    /// Number of strings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed tuning.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::standard()
    }
}

impl FromStr for Tuning {
    type Err = FretboardError;

    /// Notes separated by whitespace or commas, e.g. `"D2 A2 D3 G3 B3 E4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let strings = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(parse_note)
            .collect::<Result<Vec<_>, _>>()?;
        Tuning::new(strings)
    }
}

impl Display for Tuning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, note) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{note}")?;
        }
        Ok(())
    }
}

/// Serializable fretboard settings, e.g. loaded from a JSON file.
///
/// Missing fields fall back to the defaults of [`FretboardBuilder::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FretboardConfig {
    /// Open-string notes, lowest first.
    pub tuning: Tuning,
    /// Highest fret considered.
    pub max_fret: u8,
    /// Widest hand window for voicing enumeration, in frets.
    pub fret_span: u8,
    /// Fretting fingers available for voicing enumeration.
    pub max_fingers: u8,
}

impl Default for FretboardConfig {
    fn default() -> Self {
        FretboardConfig {
            tuning: Tuning::standard(),
            max_fret: DEFAULT_MAX_FRET,
            fret_span: DEFAULT_FRET_SPAN,
            max_fingers: DEFAULT_MAX_FINGERS,
        }
    }
}

/// Builder for a [`Fretboard`].
pub struct FretboardBuilder {
    tuning: Tuning,
    max_fret: u8,
    fret_span: u8,
    max_fingers: u8,
}

impl FretboardBuilder {
    /// Start with defaults:
    /// standard tuning, max_fret = 12, fret_span = 4, max_fingers = 4.
    pub fn new() -> Self {
        FretboardBuilder {
            tuning: Tuning::standard(),
            max_fret: DEFAULT_MAX_FRET,
            fret_span: DEFAULT_FRET_SPAN,
            max_fingers: DEFAULT_MAX_FINGERS,
        }
    }

    /// Set the open-string tuning.
    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Set the highest fret considered.
    pub fn max_fret(mut self, fret: u8) -> Self {
        self.max_fret = fret;
        self
    }

    /// Set the widest hand window, in frets.
    pub fn fret_span(mut self, span: u8) -> Self {
        self.fret_span = span;
        self
    }

    /// Set the number of fretting fingers.
    pub fn max_fingers(mut self, fingers: u8) -> Self {
        self.max_fingers = fingers;
        self
    }

    /// Finalize and create the Fretboard.
    pub fn build(self) -> Result<Fretboard, FretboardError> {
        if self.tuning.is_empty() {
            return Err(FretboardError::Configuration(
                "tuning needs at least one string".into(),
            ));
        }
        if self.fret_span == 0 {
            return Err(FretboardError::Configuration("fret_span cannot be zero".into()));
        }

        // The highest fret on the highest string must still be nameable.
        for &open in self.tuning.strings() {
            open.transpose(self.max_fret as i32).map_err(|_| {
                FretboardError::Configuration(format!(
                    "{open} + {} frets is beyond the highest representable note",
                    self.max_fret
                ))
            })?;
        }

        Ok(Fretboard {
            tuning: self.tuning,
            max_fret: self.max_fret,
            fret_span: self.fret_span,
            max_fingers: self.max_fingers,
        })
    }
}

impl Default for FretboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable fretboard configuration threaded through every lookup.
///
/// Several fretboards (e.g. standard and drop-D) can be used side by side;
/// nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fretboard {
    tuning: Tuning,
    max_fret: u8,
    fret_span: u8,
    max_fingers: u8,
}

impl Fretboard {
    /// Start customizing with a builder.
    pub fn builder() -> FretboardBuilder {
        FretboardBuilder::new()
    }

    /// Standard tuning with default limits.
    pub fn standard() -> Self {
        Fretboard {
            tuning: Tuning::standard(),
            max_fret: DEFAULT_MAX_FRET,
            fret_span: DEFAULT_FRET_SPAN,
            max_fingers: DEFAULT_MAX_FINGERS,
        }
    }

    /// Validate a deserialized configuration.
    pub fn from_config(config: FretboardConfig) -> Result<Self, FretboardError> {
        FretboardBuilder::new()
            .tuning(config.tuning)
            .max_fret(config.max_fret)
            .fret_span(config.fret_span)
            .max_fingers(config.max_fingers)
            .build()
    }

    /// Snapshot of the settings, suitable for serializing.
    pub fn config(&self) -> FretboardConfig {
        FretboardConfig {
            tuning: self.tuning.clone(),
            max_fret: self.max_fret,
            fret_span: self.fret_span,
            max_fingers: self.max_fingers,
        }
    }

    /// The open-string tuning.
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Highest fret considered.
    pub fn max_fret(&self) -> u8 {
        self.max_fret
    }

    /// Widest hand window, in frets.
    pub fn fret_span(&self) -> u8 {
        self.fret_span
    }

    /// Number of fretting fingers.
    pub fn max_fingers(&self) -> u8 {
        self.max_fingers
    }

    /// Check a raw fret number against this board.
    ///
    /// Negative values and values above `max_fret` are out of range.
    pub fn fret(&self, value: i32) -> Result<FretValue, FretboardError> {
        u8::try_from(value)
            .ok()
            .filter(|&n| n <= self.max_fret)
            .map(FretValue::Fret)
            .ok_or(FretboardError::FretOutOfRange {
                fret: value,
                max: self.max_fret,
            })
    }

    /// Note sounded by `fret` on a string tuned to `open`.
    ///
    /// Returns `Ok(None)` for a muted string.
    pub fn resolve(&self, open: Note, fret: FretValue) -> Result<Option<Note>, FretboardError> {
        let n = match fret {
            FretValue::Muted => return Ok(None),
            FretValue::Fret(n) => n,
        };
        if n > self.max_fret {
            return Err(FretboardError::FretOutOfRange {
                fret: n as i32,
                max: self.max_fret,
            });
        }
        Ok(Some(open.transpose(n as i32)?))
    }

    /// Like [`Fretboard::resolve`], addressing the string by index (0 = lowest).
    pub fn resolve_string(
        &self,
        string: usize,
        fret: FretValue,
    ) -> Result<Option<Note>, FretboardError> {
        let open = self.open_string(string)?;
        self.resolve(open, fret)
    }

    /// Open-string note at `index` (0 = lowest).
    pub fn open_string(&self, index: usize) -> Result<Note, FretboardError> {
        self.tuning
            .strings()
            .get(index)
            .copied()
            .ok_or(FretboardError::StringOutOfRange {
                index,
                strings: self.tuning.len(),
            })
    }

    /// Frets on a string tuned to `open` that sound one of `targets`.
    ///
    /// Frets are ascending from 0 to `max_fret`, and [`FretValue::Muted`]
    /// is always appended last.
    pub fn positions_for(
        &self,
        open: Note,
        targets: &PitchClassSet,
    ) -> Result<Vec<FretValue>, FretboardError> {
        let mut positions = Vec::with_capacity(self.max_fret as usize + 2);
        for fret in 0..=self.max_fret {
            let note = open.transpose(fret as i32)?;
            if targets.contains(note.pitch_class) {
                positions.push(FretValue::Fret(fret));
            }
        }
        positions.push(FretValue::Muted);
        Ok(positions)
    }
}

impl Default for Fretboard {
    fn default() -> Self {
        Fretboard::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(s: &str) -> Note {
        parse_note(s).unwrap()
    }

    #[test]
    fn resolve_adds_frets_to_open_string() {
        let fb = Fretboard::standard();
        assert_eq!(fb.resolve(note("A2"), FretValue::Fret(3)).unwrap(), Some(note("C3")));
        assert_eq!(fb.resolve(note("E4"), FretValue::OPEN).unwrap(), Some(note("E4")));
        assert_eq!(fb.resolve(note("E2"), FretValue::Fret(12)).unwrap(), Some(note("E3")));
    }

    #[test]
    fn resolve_muted_is_none() {
        let fb = Fretboard::standard();
        assert_eq!(fb.resolve(note("E2"), FretValue::Muted).unwrap(), None);
    }

    #[test]
    fn resolve_rejects_fret_past_max() {
        let fb = Fretboard::standard();
        assert_eq!(
            fb.resolve(note("E2"), FretValue::Fret(13)),
            Err(FretboardError::FretOutOfRange { fret: 13, max: 12 })
        );

        let short = Fretboard::builder().max_fret(5).build().unwrap();
        assert!(short.resolve(note("E2"), FretValue::Fret(6)).is_err());
        assert!(short.resolve(note("E2"), FretValue::Fret(5)).is_ok());
    }

    #[test]
    fn raw_frets_are_checked_against_the_board() {
        let fb = Fretboard::standard();
        assert_eq!(
            fb.fret(-1),
            Err(FretboardError::FretOutOfRange { fret: -1, max: 12 })
        );
        assert_eq!(
            fb.fret(13),
            Err(FretboardError::FretOutOfRange { fret: 13, max: 12 })
        );
        assert_eq!(
            fb.fret(300),
            Err(FretboardError::FretOutOfRange { fret: 300, max: 12 })
        );
        assert_eq!(fb.fret(7), Ok(FretValue::Fret(7)));
        assert_eq!(fb.fret(12), Ok(FretValue::Fret(12)));
        assert_eq!(
            fb.fret(-1).unwrap_err().to_string(),
            "fret -1 out of range 0..=12"
        );
    }

    #[test]
    fn presets_match_their_note_names() {
        assert_eq!(Tuning::standard(), "E2 A2 D3 G3 B3 E4".parse::<Tuning>().unwrap());
        assert_eq!(Tuning::drop_d(), "D2 A2 D3 G3 B3 E4".parse::<Tuning>().unwrap());
        assert_eq!(Tuning::standard().len(), 6);
    }

    #[test]
    fn resolve_string_by_index() {
        let fb = Fretboard::standard();
        assert_eq!(fb.resolve_string(1, FretValue::Fret(3)).unwrap(), Some(note("C3")));
        assert_eq!(
            fb.resolve_string(6, FretValue::OPEN),
            Err(FretboardError::StringOutOfRange { index: 6, strings: 6 })
        );
    }

    #[test]
    fn positions_ascending_with_mute_last() {
        let fb = Fretboard::standard();
        let targets: PitchClassSet = [PitchClass::C, PitchClass::E].into_iter().collect();
        let positions = fb.positions_for(note("A2"), &targets).unwrap();
        assert_eq!(
            positions,
            vec![FretValue::Fret(3), FretValue::Fret(7), FretValue::Muted]
        );
        assert_eq!(positions, fb.positions_for(note("A2"), &targets).unwrap());
    }

    #[test]
    fn positions_include_both_octave_ends() {
        let fb = Fretboard::standard();
        let targets: PitchClassSet = [PitchClass::E].into_iter().collect();
        assert_eq!(
            fb.positions_for(note("E2"), &targets).unwrap(),
            vec![FretValue::Fret(0), FretValue::Fret(12), FretValue::Muted]
        );
    }

    #[test]
    fn empty_targets_yield_only_mute() {
        let fb = Fretboard::standard();
        assert_eq!(
            fb.positions_for(note("G3"), &PitchClassSet::new()).unwrap(),
            vec![FretValue::Muted]
        );
    }

    #[test]
    fn tuning_presets_and_parsing() {
        assert_eq!(Tuning::standard().to_string(), "E2 A2 D3 G3 B3 E4");
        assert_eq!(Tuning::drop_d().to_string(), "D2 A2 D3 G3 B3 E4");
        assert_eq!("D2, A2 D3 G3 B3 E4".parse::<Tuning>().unwrap(), Tuning::drop_d());
        assert!("".parse::<Tuning>().is_err());
        assert!("E2 H2".parse::<Tuning>().is_err());
    }

    #[test]
    fn builder_rejects_bad_configuration() {
        assert!(matches!(
            Fretboard::builder().fret_span(0).build(),
            Err(FretboardError::Configuration(_))
        ));
        let high = Tuning::new(vec![note("B255")]).unwrap();
        assert!(matches!(
            Fretboard::builder().tuning(high).max_fret(1).build(),
            Err(FretboardError::Configuration(_))
        ));
    }

    #[test]
    fn config_from_json_with_defaults() {
        let config: FretboardConfig =
            serde_json::from_str(r#"{ "tuning": ["D2","A2","D3","G3","B3","E4"], "max_fret": 15 }"#)
                .unwrap();
        let fb = Fretboard::from_config(config).unwrap();
        assert_eq!(fb.tuning(), &Tuning::drop_d());
        assert_eq!(fb.max_fret(), 15);
        assert_eq!(fb.fret_span(), DEFAULT_FRET_SPAN);
        assert_eq!(Fretboard::from_config(fb.config()).unwrap(), fb);
    }
}
