//! Chord Catalog
//!
//! Named chords and their known voicings. Analysis code only talks to the
//! [`ChordCatalog`] trait, so catalogs can be built in memory, loaded from
//! JSON, or swapped for synthetic ones in tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::board::Fretboard;
use crate::pitch::{PitchClass, PitchClassSet};
use crate::voicing::{notes_in, root_of, Voicing, VoicingError};

/// (name, notes, known voicings) for the built-in chords.
const STANDARD_CHORDS: &[(&str, &[PitchClass], &[&str])] = &[
    ("C", &[PitchClass::C, PitchClass::E, PitchClass::G], &["x32010", "x35553"]),
    ("G", &[PitchClass::G, PitchClass::B, PitchClass::D], &["320003", "355433"]),
    ("D", &[PitchClass::D, PitchClass::Fs, PitchClass::A], &["xx0232", "x54232"]),
    ("A", &[PitchClass::A, PitchClass::Cs, PitchClass::E], &["x02220", "x02225"]),
    ("E", &[PitchClass::E, PitchClass::Gs, PitchClass::B], &["022100", "022104"]),
    ("F", &[PitchClass::F, PitchClass::A, PitchClass::C], &["133211", "133111"]),
    ("Am", &[PitchClass::A, PitchClass::C, PitchClass::E], &["x02210", "x02213"]),
    ("Em", &[PitchClass::E, PitchClass::G, PitchClass::B], &["022000", "022003"]),
    ("Dm", &[PitchClass::D, PitchClass::F, PitchClass::A], &["xx0231", "x54231"]),
];

/// Errors raised while building or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No chord with this name exists.
    #[error("unknown chord `{0}`")]
    UnknownChordName(String),

    /// Two chords share a name.
    #[error("chord `{0}` defined twice")]
    DuplicateChord(String),

    /// A chord was declared without any voicings.
    #[error("chord `{0}` has no voicings")]
    NoVoicings(String),

    /// A voicing in the catalog could not be decoded or analyzed.
    #[error("chord `{name}`: {source}")]
    Voicing {
        /// The chord whose voicing failed.
        name: String,
        /// The underlying voicing error.
        source: VoicingError,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named chord: its pitch classes and the voicings known to play it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    name: String,
    notes: PitchClassSet,
    positions: Vec<Voicing>,
}

impl Chord {
    /// Build a chord; at least one voicing is required.
    pub fn new(
        name: impl Into<String>,
        notes: PitchClassSet,
        positions: Vec<Voicing>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if positions.is_empty() {
            return Err(CatalogError::NoVoicings(name));
        }
        Ok(Chord {
            name,
            notes,
            positions,
        })
    }

    /// Chord name, e.g. `"Am"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared pitch classes.
    pub fn notes(&self) -> &PitchClassSet {
        &self.notes
    }

    /// Known voicings, in catalog order.
    pub fn positions(&self) -> &[Voicing] {
        &self.positions
    }

    /// Voicings whose sounding notes differ from the declared notes.
    pub fn mismatched_positions(
        &self,
        fretboard: &Fretboard,
    ) -> Result<Vec<&Voicing>, CatalogError> {
        let mut bad = Vec::new();
        for voicing in &self.positions {
            let sounded = notes_in(voicing, fretboard).map_err(|source| CatalogError::Voicing {
                name: self.name.clone(),
                source,
            })?;
            if sounded != self.notes {
                bad.push(voicing);
            }
        }
        Ok(bad)
    }

    /// Roots of every known voicing, by the open-string heuristic of
    /// [`root_of`].
    pub fn roots(&self, fretboard: &Fretboard) -> Result<Vec<Option<PitchClass>>, CatalogError> {
        self.positions
            .iter()
            .map(|v| {
                root_of(v, fretboard).map_err(|source| CatalogError::Voicing {
                    name: self.name.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Read-only access to named chords.
pub trait ChordCatalog {
    /// Chord called `name`, if any.
    fn lookup(&self, name: &str) -> Option<&Chord>;

    /// Every chord name, in catalog order.
    fn all_names(&self) -> Vec<&str>;

    /// Like [`ChordCatalog::lookup`], but a miss is an error.
    fn get(&self, name: &str) -> Result<&Chord, CatalogError> {
        self.lookup(name)
            .ok_or_else(|| CatalogError::UnknownChordName(name.to_string()))
    }

    /// Declared notes of `name`; empty when unknown.
    fn chord_notes(&self, name: &str) -> PitchClassSet {
        self.lookup(name).map(|c| *c.notes()).unwrap_or_default()
    }

    /// Known voicings of `name`; empty when unknown.
    fn chord_positions(&self, name: &str) -> &[Voicing] {
        self.lookup(name).map(Chord::positions).unwrap_or_default()
    }
}

/// In-memory catalog that keeps chords in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    chords: Vec<Chord>,
}

impl StaticCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        StaticCatalog::default()
    }

    /// The nine built-in open chords: C, G, D, A, E, F, Am, Em, Dm.
    pub fn standard() -> Result<Self, CatalogError> {
        let chords = STANDARD_CHORDS
            .iter()
            .map(|&(name, notes, positions)| {
                let voicings = positions
                    .iter()
                    .map(|p| p.parse::<Voicing>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|source| CatalogError::Voicing {
                        name: name.to_string(),
                        source,
                    })?;
                Chord::new(name, notes.iter().copied().collect(), voicings)
            })
            .collect::<Result<Vec<_>, _>>()?;
        StaticCatalog::from_chords(chords)
    }

    /// Build a catalog from chords; names must be unique.
    pub fn from_chords(chords: impl IntoIterator<Item = Chord>) -> Result<Self, CatalogError> {
        let mut catalog = StaticCatalog::new();
        for chord in chords {
            catalog.insert(chord)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON array of `{ "name", "notes", "positions" }` records.
    ///
    /// ```json
    /// [{ "name": "C", "notes": ["C", "E", "G"], "positions": ["x32010"] }]
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<ChordRecord> = serde_json::from_str(json)?;
        let catalog = StaticCatalog::from_chords(
            records
                .into_iter()
                .map(ChordRecord::into_chord)
                .collect::<Result<Vec<_>, _>>()?,
        )?;
        debug!(chords = catalog.len(), "loaded chord catalog");
        Ok(catalog)
    }

    /// Serialize to the JSON accepted by [`StaticCatalog::from_json`].
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(&self.chords)?)
    }

    /// Add a chord, rejecting a duplicate name.
    pub fn insert(&mut self, chord: Chord) -> Result<(), CatalogError> {
        if self.lookup(chord.name()).is_some() {
            return Err(CatalogError::DuplicateChord(chord.name));
        }
        self.chords.push(chord);
        Ok(())
    }

    /// Number of chords.
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    /// Whether the catalog holds no chords.
    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Chords in insertion order.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Names of chords with a voicing that does not sound the declared notes.
    pub fn verify(&self, fretboard: &Fretboard) -> Result<Vec<&str>, CatalogError> {
        let mut failing = Vec::new();
        for chord in &self.chords {
            let bad = chord.mismatched_positions(fretboard)?;
            for voicing in &bad {
                warn!(
                    chord = chord.name(),
                    voicing = %voicing,
                    expected = %chord.notes(),
                    "voicing does not sound its chord"
                );
            }
            if !bad.is_empty() {
                failing.push(chord.name());
            }
        }
        Ok(failing)
    }
}

impl ChordCatalog for StaticCatalog {
    fn lookup(&self, name: &str) -> Option<&Chord> {
        self.chords.iter().find(|c| c.name == name)
    }

    fn all_names(&self) -> Vec<&str> {
        self.chords.iter().map(Chord::name).collect()
    }
}

/// Serialized chord before validation.
#[derive(Deserialize)]
struct ChordRecord {
    name: String,
    notes: PitchClassSet,
    positions: Vec<String>,
}

impl ChordRecord {
    fn into_chord(self) -> Result<Chord, CatalogError> {
        let positions = self
            .positions
            .iter()
            .map(|p| p.parse::<Voicing>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CatalogError::Voicing {
                name: self.name.clone(),
                source,
            })?;
        Chord::new(self.name, self.notes, positions)
    }
}
