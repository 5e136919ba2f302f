//! Test fixtures and data for processor tests
//!
//! This module provides consistent test data and fixtures used across all test suites.

use serde_json::json;
use shared::{Collection, Record};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const INPUT_FILE: &'static str = "input.json";
    pub const OUTPUT_FILE: &'static str = "output.json";

    /// User-profile records with unique ids
    pub fn users() -> Collection {
        vec![
            Self::user(1, "Ada", "ada@example.com"),
            Self::user(2, "Grace", "grace@example.com"),
            Self::user(3, "Linus", "linus@example.com"),
        ]
        .into()
    }

    /// Records where id 2 appears twice, the first occurrence named "first"
    pub fn users_with_duplicate_ids() -> Collection {
        vec![
            Self::user(1, "Ada", "ada@example.com"),
            Self::user(2, "first", "first@example.com"),
            Self::user(3, "Linus", "linus@example.com"),
            Self::user(2, "second", "second@example.com"),
        ]
        .into()
    }

    pub fn user(id: i64, name: &str, email: &str) -> Record {
        Record::new()
            .with("id", id)
            .with("name", name)
            .with("email", email)
    }

    /// Records carrying every score attribute
    pub fn scorable() -> Collection {
        vec![
            Self::metrics(1, 150, 0.9, 0.95),
            Self::metrics(2, 50, 0.5, 0.5),
            Self::metrics(3, 101, 0.2, 0.91),
        ]
        .into()
    }

    pub fn metrics(id: i64, count: u64, accuracy: f64, completeness: f64) -> Record {
        Record::new()
            .with("id", id)
            .with("count", count)
            .with("accuracy", accuracy)
            .with("completeness", completeness)
    }

    /// Raw JSON text for a valid collection file
    pub fn collection_json() -> String {
        json!([
            {"id": 1, "count": 150, "accuracy": 0.9, "completeness": 0.95},
            {"id": "b", "count": 10, "accuracy": 0.99, "completeness": 0.1}
        ])
        .to_string()
    }

    /// Large dataset with a controlled fraction of repeated values
    pub fn large_dataset(size: usize, unique_ratio: f64) -> Vec<String> {
        let unique_count = ((size as f64 * unique_ratio) as usize).max(1);
        (0..size).map(|i| format!("Item_{}", i % unique_count)).collect()
    }
}
