//! Unit tests for the data processing utilities
//!
//! These tests pin down the documented contracts of the duplicate finder,
//! record lookup and scorer through the public API.

use processor::core::{find_duplicate_pairs, find_duplicates, find_record, RecordIndex};
use processor::{ScoreInput, Scorer, ValidationError};
use shared::{Record, RecordId};

mod common;
use common::TestFixtures;

/// Test that sequences without repeats never report duplicates
#[test]
fn test_no_repeats_no_duplicates() {
    let sequences: Vec<Vec<i64>> = vec![vec![], vec![1], (0..100).collect(), vec![5, -5, 0]];

    for sequence in sequences {
        assert!(find_duplicates(&sequence).is_empty(), "{sequence:?}");
        assert!(find_duplicate_pairs(&sequence).is_empty(), "{sequence:?}");
    }
}

/// Test both duplicate contracts for one value repeated k times
///
/// The de-duplicated contract is primary: the value is reported once. The
/// pair contract reports it C(k, 2) times.
#[test]
fn test_single_value_repeated_k_times() {
    for k in 2..=6usize {
        let mut sequence = vec!["other".to_string()];
        sequence.extend(std::iter::repeat("dup".to_string()).take(k));
        sequence.push("tail".to_string());

        assert_eq!(find_duplicates(&sequence), vec!["dup".to_string()]);

        let pairs = find_duplicate_pairs(&sequence);
        assert_eq!(pairs.len(), k * (k - 1) / 2);
        assert!(pairs.iter().all(|v| v == "dup"));
    }
}

/// Test large data handling and performance characteristics
#[test]
fn test_large_data_handling() {
    let data = TestFixtures::large_dataset(20_000, 0.5);

    let start_time = std::time::Instant::now();
    let duplicates = find_duplicates(&data);
    let elapsed = start_time.elapsed();

    assert_eq!(duplicates.len(), 10_000);
    assert!(elapsed.as_millis() < 1000, "Processing took too long: {elapsed:?}");
}

/// Test lookup on an empty collection
#[test]
fn test_lookup_empty_collection() {
    let records: Vec<Record> = Vec::new();

    assert!(find_record(&records, &RecordId::Int(1)).is_none());
    assert!(RecordIndex::build(&records).get(&RecordId::Int(1)).is_none());
}

/// Test that lookup returns the first record when ids repeat
#[test]
fn test_lookup_first_of_duplicates() {
    let collection = TestFixtures::users_with_duplicate_ids();
    let id = RecordId::Int(2);

    let scanned = find_record(collection.records(), &id).unwrap();
    let index = RecordIndex::build(collection.records());

    assert_eq!(scanned.get("name").unwrap().as_str(), Some("first"));
    assert_eq!(index.get(&id).unwrap().get("name").unwrap().as_str(), Some("first"));
    assert_eq!(index.duplicate_ids(), vec![id]);
}

/// Test the reference score values
#[test]
fn test_reference_scores() {
    let scorer = Scorer::default();

    assert_eq!(scorer.score(&ScoreInput::new(150, 0.9, 0.95)), 100);
    assert_eq!(scorer.score(&ScoreInput::new(50, 0.5, 0.5)), 0);
}

/// Test that a missing accuracy field is a validation error, not a zero
#[test]
fn test_missing_accuracy_fails() {
    let scorer = Scorer::default();
    let mut record = TestFixtures::metrics(1, 150, 0.9, 0.95);
    record.remove("accuracy");

    let result = scorer.score_record(&record);

    assert_eq!(
        result,
        Err(ValidationError::MissingField { field: "accuracy".to_string() })
    );
}

/// Test scoring of each fixture record
#[test]
fn test_fixture_scores() {
    let scorer = Scorer::default();
    let scores: Vec<u32> = TestFixtures::scorable()
        .iter()
        .map(|record| scorer.score_record(record).unwrap())
        .collect();

    // third record: count 101 (+50), completeness 0.91 (+20)
    assert_eq!(scores, vec![100, 0, 70]);
}
