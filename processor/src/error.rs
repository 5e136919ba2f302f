//! Processor error types

use std::path::PathBuf;
use thiserror::Error;
use shared::SharedError;

use crate::core::directory::DirectoryError;
use crate::core::expression::ExpressionError;

/// Failures of the record store collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Malformed content in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Failed to serialize collection for {path}: {source}")]
    Serialize { path: PathBuf, source: serde_json::Error },
}

/// Record content that does not satisfy an operation's requirements
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Record at position {index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::MissingField { field: field.to_string() }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the position of the offending record
    pub fn at(self, index: usize) -> Self {
        Self::InvalidRecord {
            index,
            source: Box::new(self),
        }
    }
}

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Invalid configuration: {field} ({reason})")]
    Invalid { field: String, reason: String },
}

/// Pipeline stage names, used to report where a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    Validate,
    Transform,
    Save,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Load => write!(f, "load"),
            PipelineStage::Validate => write!(f, "validate"),
            PipelineStage::Transform => write!(f, "transform"),
            PipelineStage::Save => write!(f, "save"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("Pipeline failed at {stage} stage: {source}")]
    Pipeline {
        stage: PipelineStage,
        #[source]
        source: Box<ProcessorError>,
    },
}

impl ProcessorError {
    /// Wrap an error with the pipeline stage it occurred in
    pub fn in_stage(stage: PipelineStage, source: impl Into<ProcessorError>) -> Self {
        Self::Pipeline {
            stage,
            source: Box::new(source.into()),
        }
    }

    /// The stage a pipeline error was raised in, if any
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Pipeline { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type ProcessorResult<T> = Result<T, ProcessorError>;
pub type StoreResult<T> = Result<T, StoreError>;
