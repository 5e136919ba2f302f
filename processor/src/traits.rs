//! Trait definitions with mockall annotations for testing
//!
//! The record store is the only I/O seam of the processor. Production code
//! uses [`crate::services::RealFileStore`]; tests inject `MockRecordStore`.

use std::path::Path;
use shared::{Collection, Record};

use crate::error::{StoreResult, ValidationError};

/// Storage abstraction for loading and persisting record collections
#[mockall::automock]
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Read a collection from storage
    ///
    /// # Errors
    /// `StoreError::Read` when the source is missing or unreadable,
    /// `StoreError::Parse` when its content is not a JSON array of objects
    async fn load(&self, path: &Path) -> StoreResult<Collection>;

    /// Persist a collection, replacing any previous content
    ///
    /// # Errors
    /// `StoreError::Write` on I/O failure
    async fn save(&self, path: &Path, collection: &Collection) -> StoreResult<()>;
}

/// Per-record transformation applied by the pipeline's transform stage
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, record: Record) -> Result<Record, ValidationError>;
}
