//! Test helpers and builder patterns for processor tests
//!
//! This module provides convenient helper functions and builder patterns
//! to reduce test boilerplate and improve maintainability.

use std::path::Path;
use processor::traits::MockRecordStore;
use processor::{DataProcessor, ProcessorConfig, StoreError};
use shared::Collection;
use tempfile::TempDir;

/// Builder for test processors backed by a mock store
pub struct ProcessorBuilder {
    config: ProcessorConfig,
    store: MockRecordStore,
}

impl ProcessorBuilder {
    /// Create a new builder whose store accepts any save
    pub fn new() -> Self {
        let mut store = MockRecordStore::new();
        store.expect_save().returning(|_, _| Ok(())).times(0..);

        Self {
            config: ProcessorConfig::default(),
            store,
        }
    }

    /// Serve `collection` from every load
    pub fn with_data(mut self, collection: Collection) -> Self {
        self.store
            .expect_load()
            .returning(move |_| Ok(collection.clone()))
            .times(0..);
        self
    }

    /// Fail every load with a not-found read error
    pub fn with_missing_source(mut self) -> Self {
        self.store
            .expect_load()
            .returning(|path| {
                Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                })
            })
            .times(0..);
        self
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the store mock with a setup function
    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockRecordStore),
    {
        setup(&mut self.store);
        self
    }

    pub fn build(self) -> DataProcessor<MockRecordStore> {
        DataProcessor::new(self.config, self.store)
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Processor already holding `collection`
    pub async fn loaded_processor(collection: Collection) -> DataProcessor<MockRecordStore> {
        let mut processor = ProcessorBuilder::new().with_data(collection).build();
        processor
            .load_data(Path::new("fixture.json"))
            .await
            .expect("fixture load");
        processor
    }

    /// Write raw text into a fresh temp directory
    pub async fn write_temp(name: &str, content: &str) -> TempDir {
        let dir = TempDir::new().expect("create temp dir");
        tokio::fs::write(dir.path().join(name), content)
            .await
            .expect("write fixture file");
        dir
    }
}
