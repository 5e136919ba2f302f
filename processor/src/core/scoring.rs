//! Threshold scoring
//!
//! A score is the sum of the weights of every rule whose measured value is
//! strictly greater than the rule's threshold.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{json_type_name, Record};

use crate::error::ValidationError;

/// Count above which the count rule applies
pub const DEFAULT_COUNT_THRESHOLD: u64 = 100;
/// Points awarded by the count rule
pub const DEFAULT_COUNT_WEIGHT: u32 = 50;
/// Accuracy ratio above which the accuracy rule applies
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 0.85;
/// Points awarded by the accuracy rule
pub const DEFAULT_ACCURACY_WEIGHT: u32 = 30;
/// Completeness ratio above which the completeness rule applies
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 0.90;
/// Points awarded by the completeness rule
pub const DEFAULT_COMPLETENESS_WEIGHT: u32 = 20;

pub const COUNT_FIELD: &str = "count";
pub const ACCURACY_FIELD: &str = "accuracy";
pub const COMPLETENESS_FIELD: &str = "completeness";

/// One threshold/weight pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule<T> {
    pub threshold: T,
    pub weight: u32,
}

impl<T: PartialOrd> ThresholdRule<T> {
    pub fn points(&self, value: T) -> u32 {
        if value > self.threshold {
            self.weight
        } else {
            0
        }
    }
}

/// The three rules used by [`Scorer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub count: ThresholdRule<u64>,
    pub accuracy: ThresholdRule<f64>,
    pub completeness: ThresholdRule<f64>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            count: ThresholdRule {
                threshold: DEFAULT_COUNT_THRESHOLD,
                weight: DEFAULT_COUNT_WEIGHT,
            },
            accuracy: ThresholdRule {
                threshold: DEFAULT_ACCURACY_THRESHOLD,
                weight: DEFAULT_ACCURACY_WEIGHT,
            },
            completeness: ThresholdRule {
                threshold: DEFAULT_COMPLETENESS_THRESHOLD,
                weight: DEFAULT_COMPLETENESS_WEIGHT,
            },
        }
    }
}

impl ScoringRules {
    /// Highest score these rules can award, saturating at `u32::MAX`
    pub fn max_score(&self) -> u32 {
        self.count
            .weight
            .saturating_add(self.accuracy.weight)
            .saturating_add(self.completeness.weight)
    }

    /// Sum of the weights, or `None` when it does not fit in a `u32`
    pub fn checked_max_score(&self) -> Option<u32> {
        self.count
            .weight
            .checked_add(self.accuracy.weight)?
            .checked_add(self.completeness.weight)
    }
}

/// Validated attributes a score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub count: u64,
    pub accuracy: f64,
    pub completeness: f64,
}

impl ScoreInput {
    pub fn new(count: u64, accuracy: f64, completeness: f64) -> Self {
        Self {
            count,
            accuracy,
            completeness,
        }
    }

    /// Read and validate the score attributes of a record
    ///
    /// Absent fields are errors, never zeros.
    pub fn from_record(record: &Record) -> Result<Self, ValidationError> {
        let count = read_count(record)?;
        let accuracy = read_ratio(record, ACCURACY_FIELD)?;
        let completeness = read_ratio(record, COMPLETENESS_FIELD)?;
        Ok(Self::new(count, accuracy, completeness))
    }
}

fn required<'r>(record: &'r Record, field: &str) -> Result<&'r Value, ValidationError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing(field)),
        Some(value) => Ok(value),
    }
}

fn read_count(record: &Record) -> Result<u64, ValidationError> {
    let value = required(record, COUNT_FIELD)?;
    value.as_u64().ok_or_else(|| {
        ValidationError::invalid(
            COUNT_FIELD,
            format!("expected a non-negative integer, found {}", describe(value)),
        )
    })
}

fn read_ratio(record: &Record, field: &str) -> Result<f64, ValidationError> {
    let value = required(record, field)?;
    match value.as_f64() {
        Some(ratio) if ratio.is_finite() => Ok(ratio),
        _ => Err(ValidationError::invalid(
            field,
            format!("expected a number, found {}", describe(value)),
        )),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => json_type_name(other).to_string(),
    }
}

/// Applies a set of [`ScoringRules`]
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    rules: ScoringRules,
}

impl Scorer {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn score(&self, input: &ScoreInput) -> u32 {
        self.rules
            .count
            .points(input.count)
            .saturating_add(self.rules.accuracy.points(input.accuracy))
            .saturating_add(self.rules.completeness.points(input.completeness))
    }

    pub fn score_record(&self, record: &Record) -> Result<u32, ValidationError> {
        ScoreInput::from_record(record).map(|input| self.score(&input))
    }
}
