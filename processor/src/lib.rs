//! Data processing utilities
//!
//! Duplicate detection, record lookup and threshold scoring over in-memory
//! record collections, plus the collaborators around them: a JSON record
//! store, a staged load/validate/transform/save pipeline, a sandboxed
//! arithmetic evaluator and a user account directory.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{PartialConfig, ProcessorConfig};
pub use crate::core::{Scorer, ScoreInput, ScoringRules, UserDirectory};
pub use error::{ProcessorError, ProcessorResult, StoreError, ValidationError};
pub use pipeline::{Pipeline, PipelineReport};
pub use processor::{DataProcessor, DuplicateMode};
pub use traits::{RecordStore, Transform};
