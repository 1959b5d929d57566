use moments_core::{fingerprint, Note};
use uuid::Uuid;

fn notes() -> Vec<Note> {
    vec![
        Note::with_id(Uuid::from_u128(1), "Team lunch", "Everyone is friendly.", 1_000),
        Note::with_id(Uuid::from_u128(2), "Weekend hiking", "Mountain views.", 2_000),
    ]
}

#[test]
fn same_ordered_notes_hash_identically() {
    assert_eq!(fingerprint(&notes()), fingerprint(&notes()));
}

#[test]
fn permuting_notes_changes_the_digest() {
    let mut reversed = notes();
    reversed.reverse();
    assert_ne!(fingerprint(&notes()), fingerprint(&reversed));
}

#[test]
fn any_field_change_changes_the_digest() {
    let base = fingerprint(&notes());

    let mut edited = notes();
    edited[0].content.push('!');
    assert_ne!(fingerprint(&edited), base);

    let mut moved = notes();
    moved[1].created_at += 1;
    assert_ne!(fingerprint(&moved), base);

    let mut renamed = notes();
    renamed[0].id = Uuid::from_u128(3);
    assert_ne!(fingerprint(&renamed), base);
}

#[test]
fn empty_collection_has_a_stable_digest() {
    assert_eq!(fingerprint(&[]), fingerprint(&[]));
    assert_eq!(fingerprint(&[]).len(), 64);
}
