//! # fretboard
//!
//! Map guitar fretboard positions to pitches, analyze chord voicings, and
//! enumerate the voicings that sound a set of pitch classes.
//!
//! ## Example
//! ```rust
//! use fretboard::{notes_in, root_of, FretValue, Fretboard, Note, PitchClass, Voicing};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Configure a fretboard (standard tuning, frets 0..=12)
//!     let fb = Fretboard::builder().max_fret(12).build()?;
//!
//!     // 2) Resolve a single position
//!     let a2: Note = "A2".parse()?;
//!     let c3 = fb.resolve(a2, FretValue::Fret(3))?;
//!     assert_eq!(c3.map(|n| n.to_string()), Some("C3".to_string()));
//!
//!     // 3) Analyze a full voicing
//!     let e_major: Voicing = "022100".parse()?;
//!     println!("notes {}", notes_in(&e_major, &fb)?);
//!     assert_eq!(root_of(&e_major, &fb)?, Some(PitchClass::E));
//!
//!     Ok(())
//! }
//! # run().unwrap();
//! ```
//!
//! All operations are pure; a [`Fretboard`] is an immutable value and can be
//! shared freely between threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// Note names and semitone arithmetic.
pub use pitch::{
    note_to_semitone, parse_note, semitone_to_note, Note, PitchClass, PitchClassSet, PitchError,
};

/// Tunings and fret lookups.
pub use board::{FretValue, Fretboard, FretboardBuilder, FretboardConfig, FretboardError, Tuning};

/// Voicing analysis and enumeration.
pub use voicing::{
    normalize, notes_in, realizes, root_of, sounding_notes, voicings_for, Voicing, VoicingError,
};

/// Named chord catalogs.
pub use catalog::{CatalogError, Chord, ChordCatalog, StaticCatalog};

/// Pitch model module.
pub mod pitch;

/// Fretboard model module.
pub mod board;

/// Voicing analyzer module.
pub mod voicing;

/// Chord catalog module.
pub mod catalog;
