//! Processor configuration
//!
//! Built by the caller and handed to [`crate::DataProcessor`]; nothing here
//! is process-global. Values come from defaults, an optional JSON file and
//! `PROCESSOR_*` environment variables, in that order.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use shared::logging::{DEFAULT_ACTIVITY_CAPACITY, LOG_LEVELS};

use crate::core::scoring::ScoringRules;
use crate::error::ConfigError;

pub const ENV_DATA_FILE: &str = "PROCESSOR_DATA_FILE";
pub const ENV_OUTPUT_FILE: &str = "PROCESSOR_OUTPUT_FILE";
pub const ENV_LOG_LEVEL: &str = "PROCESSOR_LOG_LEVEL";
pub const ENV_ACTIVITY_LOG_CAPACITY: &str = "PROCESSOR_ACTIVITY_LOG_CAPACITY";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ProcessorConfig {
    pub scoring: ScoringRules,
    pub activity_log_capacity: usize,
    pub data_file: PathBuf,
    pub output_file: PathBuf,
    pub log_level: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRules::default(),
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            data_file: PathBuf::from("data.json"),
            output_file: PathBuf::from("output.json"),
            log_level: "info".to_string(),
        }
    }
}

/// Subset of settings to overlay onto an existing configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PartialConfig {
    pub scoring: Option<ScoringRules>,
    pub activity_log_capacity: Option<usize>,
    pub data_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ProcessorConfig {
    /// Load a configuration file; absent keys keep their defaults
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(path, &content)
    }

    fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply only the settings present in `other`
    pub fn merge(&mut self, other: PartialConfig) {
        if let Some(scoring) = other.scoring {
            self.scoring = scoring;
        }
        if let Some(capacity) = other.activity_log_capacity {
            self.activity_log_capacity = capacity;
        }
        if let Some(data_file) = other.data_file {
            self.data_file = data_file;
        }
        if let Some(output_file) = other.output_file {
            self.output_file = output_file;
        }
        if let Some(log_level) = other.log_level {
            self.log_level = log_level;
        }
    }

    /// Overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Overrides from any key lookup, e.g. a map in tests
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = match lookup(ENV_ACTIVITY_LOG_CAPACITY) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
                field: ENV_ACTIVITY_LOG_CAPACITY.to_string(),
                reason: format!("'{raw}' is not a whole number"),
            })?),
            None => None,
        };

        self.merge(PartialConfig {
            scoring: None,
            activity_log_capacity: capacity,
            data_file: lookup(ENV_DATA_FILE).map(PathBuf::from),
            output_file: lookup(ENV_OUTPUT_FILE).map(PathBuf::from),
            log_level: lookup(ENV_LOG_LEVEL),
        });
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.activity_log_capacity == 0 {
            return Err(invalid("activity_log_capacity", "must be greater than zero"));
        }

        for (field, threshold) in [
            ("scoring.accuracy.threshold", self.scoring.accuracy.threshold),
            ("scoring.completeness.threshold", self.scoring.completeness.threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(invalid(field, format!("{threshold} is outside 0..=1")));
            }
        }

        if self.scoring.checked_max_score().is_none() {
            return Err(invalid("scoring", "sum of rule weights exceeds u32::MAX"));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "log_level",
                format!("'{}' is not one of {}", self.log_level, LOG_LEVELS.join(", ")),
            ));
        }

        if self.data_file.as_os_str().is_empty() {
            return Err(invalid("data_file", "must not be empty"));
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(invalid("output_file", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}
