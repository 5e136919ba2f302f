//! Core business logic modules
//!
//! This module contains pure business logic with no I/O dependencies.
//! All functions are deterministic and easily testable.

pub mod directory;
pub mod duplicates;
pub mod expression;
pub mod lookup;
pub mod scoring;

pub use directory::{UserAccount, UserDirectory};
pub use duplicates::{
    duplicate_counts, find_duplicate_pairs, find_duplicate_pairs_by_eq, find_duplicates,
    find_duplicates_by_eq,
};
pub use lookup::{find_record, PositionIndex, RecordIndex};
pub use scoring::{ScoreInput, Scorer, ScoringRules, ThresholdRule};
