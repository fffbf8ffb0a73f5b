// tests/matching_tests.rs
mod common;

use common::{entry, Scripted};
use syncbuddy::matching::{match_automatic, match_manual};
use syncbuddy::SyncError;

fn names(entries: &[&syncbuddy::DirectoryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.path.display().to_string())
        .collect()
}

#[test]
fn automatic_matching_pairs_by_position() {
    common::setup();
    let sources = vec![entry("A", false), entry("B", false), entry("C", false)];
    let destinations = vec![entry("X", false), entry("Y", false)];

    let outcome = match_automatic(&sources, &destinations);

    let pairs: Vec<(String, String)> = outcome
        .pairs
        .iter()
        .map(|p| {
            (
                p.source.path.display().to_string(),
                p.destination.path.display().to_string(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![("A".into(), "X".into()), ("B".into(), "Y".into())]
    );
    assert_eq!(names(&outcome.unmatched_sources), vec!["C"]);
    assert!(outcome.unmatched_destinations.is_empty());
}

#[test]
fn manual_matching_uses_operator_choice() {
    let sources = vec![entry("A", false), entry("B", true)];
    let destinations = vec![entry("X", true), entry("Y", false)];
    let mut prompt = Scripted::pairing(vec![(0, 1), (1, 0)]);

    let outcome = match_manual(&sources, &destinations, &mut prompt).unwrap();

    assert_eq!(outcome.pairs.len(), 2);
    assert_eq!(outcome.pairs[0].destination.path.display().to_string(), "Y");
    assert_eq!(outcome.pairs[1].destination.path.display().to_string(), "X");
    assert!(outcome.unmatched_sources.is_empty());
}

#[test]
fn manual_matching_reports_skipped_directories() {
    let sources = vec![entry("A", false), entry("B", false)];
    let destinations = vec![entry("X", false), entry("Y", false)];
    let mut prompt = Scripted::pairing(vec![(1, 0)]);

    let outcome = match_manual(&sources, &destinations, &mut prompt).unwrap();

    assert_eq!(names(&outcome.unmatched_sources), vec!["A"]);
    assert_eq!(names(&outcome.unmatched_destinations), vec!["Y"]);
}

#[test]
fn manual_matching_rejects_duplicates_and_bad_indices() {
    let sources = vec![entry("A", false), entry("B", false)];
    let destinations = vec![entry("X", false)];

    let mut twice = Scripted::pairing(vec![(0, 0), (1, 0)]);
    assert!(matches!(
        match_manual(&sources, &destinations, &mut twice),
        Err(SyncError::AmbiguousMatch(_))
    ));

    let mut out_of_range = Scripted::pairing(vec![(0, 3)]);
    let err = match_manual(&sources, &destinations, &mut out_of_range).unwrap_err();
    assert!(err.is_configuration());
}
