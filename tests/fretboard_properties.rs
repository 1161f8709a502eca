//! Properties of the pitch, fretboard and voicing layers, and catalog injection.

use fretboard::{
    note_to_semitone, notes_in, parse_note, root_of, semitone_to_note, CatalogError, Chord,
    ChordCatalog, FretValue, Fretboard, FretboardError, PitchClass, PitchClassSet, PitchError,
    Tuning, Voicing,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeMap;

fn set(names: &[&str]) -> PitchClassSet {
    names.iter().map(|n| n.parse::<PitchClass>().unwrap()).collect()
}

#[test]
fn semitones_round_trip_through_notes() {
    (0..3072).into_par_iter().for_each(|s| {
        let note = semitone_to_note(s).unwrap();
        assert_eq!(note_to_semitone(note), s);
        assert_eq!(semitone_to_note(note_to_semitone(note)).unwrap(), note);
    });
}

#[test]
fn malformed_note_text() {
    assert!(matches!(parse_note("H4"), Err(PitchError::InvalidNoteFormat { .. })));
    assert!(matches!(parse_note("C"), Err(PitchError::InvalidNoteFormat { .. })));
}

#[test]
fn fret_thirteen_is_out_of_range() {
    let fb = Fretboard::standard();
    let e2 = parse_note("E2").unwrap();
    assert_eq!(
        fb.resolve(e2, FretValue::Fret(13)),
        Err(FretboardError::FretOutOfRange { fret: 13, max: 12 })
    );
}

#[test]
fn positions_on_the_a_string() {
    let fb = Fretboard::standard();
    let a2 = parse_note("A2").unwrap();
    let positions = fb.positions_for(a2, &set(&["C", "E"])).unwrap();
    assert_eq!(
        positions,
        vec![FretValue::Fret(3), FretValue::Fret(7), FretValue::Muted]
    );
}

#[test]
fn positions_are_deterministic_under_parallel_use() {
    let boards = [
        Fretboard::standard(),
        Fretboard::builder().tuning(Tuning::drop_d()).max_fret(15).build().unwrap(),
    ];

    // every subset of pitch classes, mask 0..4096
    (0u16..4096).into_par_iter().for_each(|mask| {
        let targets: PitchClassSet = PitchClass::ALL
            .into_iter()
            .filter(|pc| mask & (1u16 << pc.index()) != 0)
            .collect();
        for fb in &boards {
            for &open in fb.tuning().strings() {
                let first = fb.positions_for(open, &targets).unwrap();
                assert_eq!(first, fb.positions_for(open, &targets).unwrap());
                assert_eq!(first.last(), Some(&FretValue::Muted));
                let frets: Vec<u8> = first.iter().filter_map(|f| f.fret()).collect();
                assert!(frets.windows(2).all(|w| w[0] < w[1]));
                assert!(frets.iter().all(|&f| f <= fb.max_fret()));
            }
        }
    });
}

#[test]
fn worked_voicings() {
    let fb = Fretboard::standard();

    let c: Voicing = "x32010".parse().unwrap();
    assert_eq!(notes_in(&c, &fb).unwrap(), set(&["C", "E", "G"]));
    assert_eq!(root_of(&c, &fb).unwrap(), Some(PitchClass::G));

    let e: Voicing = "022100".parse().unwrap();
    assert_eq!(notes_in(&e, &fb).unwrap(), set(&["E", "G#", "B"]));
    assert_eq!(root_of(&e, &fb).unwrap(), Some(PitchClass::E));

    let muted: Voicing = "xxxxxx".parse().unwrap();
    assert!(notes_in(&muted, &fb).unwrap().is_empty());
    assert_eq!(root_of(&muted, &fb).unwrap(), None);
}

#[test]
fn same_voicing_on_two_tunings() {
    let standard = Fretboard::standard();
    let drop_d = Fretboard::builder().tuning(Tuning::drop_d()).build().unwrap();
    let voicing: Voicing = "002220".parse().unwrap();

    assert_eq!(root_of(&voicing, &standard).unwrap(), Some(PitchClass::E));
    assert_eq!(root_of(&voicing, &drop_d).unwrap(), Some(PitchClass::D));
}

/// Catalog backed by a sorted map, standing in for an external data source.
struct MapCatalog(BTreeMap<String, Chord>);

impl ChordCatalog for MapCatalog {
    fn lookup(&self, name: &str) -> Option<&Chord> {
        self.0.get(name)
    }

    fn all_names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

#[test]
fn analysis_works_through_any_catalog() {
    let mut map = BTreeMap::new();
    let chords = [
        ("Esus4", &["E", "A", "B"][..], "022200"),
        ("E5", &["E", "B"][..], "022xxx"),
    ];
    for (name, notes, voicing) in chords {
        let chord = Chord::new(name, set(notes), vec![voicing.parse().unwrap()]).unwrap();
        map.insert(name.to_string(), chord);
    }
    let catalog = MapCatalog(map);
    let fb = Fretboard::standard();

    assert_eq!(catalog.all_names(), vec!["E5", "Esus4"]);
    for name in catalog.all_names() {
        let chord = catalog.get(name).unwrap();
        assert!(chord.mismatched_positions(&fb).unwrap().is_empty(), "{name}");
    }
    assert!(matches!(catalog.get("Esus2"), Err(CatalogError::UnknownChordName(_))));
    assert!(catalog.chord_positions("Esus2").is_empty());
}
