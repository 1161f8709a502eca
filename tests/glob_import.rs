//! The crate root can be glob-imported without name clashes.

use fretboard::*;

#[test]
fn glob_import_resolves_every_layer() {
    let fb = Fretboard::standard();
    let voicing: Voicing = "x32010".parse().unwrap();
    assert_eq!(root_of(&voicing, &fb).unwrap(), Some(PitchClass::G));
    assert_eq!(fb.fret(3).unwrap(), FretValue::Fret(3));

    let catalog = StaticCatalog::standard().unwrap();
    assert_eq!(catalog.get("C").unwrap().name(), "C");
    assert_eq!(board::Tuning::standard(), Tuning::standard());
}
