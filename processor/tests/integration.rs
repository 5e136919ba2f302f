//! Integration tests for the data processor
//!
//! These tests drive `DataProcessor` end to end, with mockall-generated
//! stores for failure paths and a real file store in a temp directory.

use std::path::Path;
use assert_matches::assert_matches;
use processor::error::PipelineStage;
use processor::services::RealFileStore;
use processor::traits::RecordStore;
use processor::{DataProcessor, DuplicateMode, ProcessorConfig, ProcessorError, StoreError};
use serde_json::Value;
use shared::{ActivityLayer, ActivityLog, RecordId};
use tracing_subscriber::prelude::*;

mod common;
use common::{ProcessorBuilder, TestFixtures, TestHelpers};

/// Test that loading replaces the collection and is logged
#[tokio::test]
async fn test_load_data() {
    let mut processor = ProcessorBuilder::new().with_data(TestFixtures::users()).build();

    let count = processor.load_data(Path::new(TestFixtures::INPUT_FILE)).await.unwrap();

    assert_eq!(count, 3);
    assert_eq!(processor.records().len(), 3);
    assert_eq!(processor.activity().len(), 1);
    assert!(processor.activity().entries()[0].message.contains("Loaded 3 records"));
}

/// Test that a missing source surfaces as a typed read error
#[tokio::test]
async fn test_load_missing_source() {
    let mut processor = ProcessorBuilder::new().with_missing_source().build();

    let result = processor.load_data(Path::new("missing.json")).await;

    assert_matches!(result, Err(ProcessorError::Store(StoreError::Read { .. })));
    assert!(processor.records().is_empty());
}

/// Test indexed lookup through the processor, including not found
#[tokio::test]
async fn test_get_record_by_id() {
    let mut processor = TestHelpers::loaded_processor(TestFixtures::users_with_duplicate_ids()).await;

    let found = processor.get_record_by_id(&RecordId::Int(2)).unwrap();
    assert_eq!(found.get("name").unwrap().as_str(), Some("first"));

    assert!(processor.get_record_by_id(&RecordId::Int(42)).is_none());
    assert!(processor.get_record_by_id(&RecordId::from("2")).is_none());
}

/// Test duplicate detection on a record field
#[tokio::test]
async fn test_find_duplicate_ids() {
    let processor = TestHelpers::loaded_processor(TestFixtures::users_with_duplicate_ids()).await;

    assert_eq!(processor.find_duplicates("id", DuplicateMode::Distinct), vec![Value::from(2)]);
    assert!(processor.find_duplicates("email", DuplicateMode::Distinct).is_empty());
}

/// Test the expression calculator rejects anything but arithmetic
#[tokio::test]
async fn test_calculate_expression() {
    let processor = ProcessorBuilder::new().build();

    assert_eq!(processor.calculate_expression("(2 + 3) * 4").unwrap(), 20.0);
    assert_matches!(
        processor.calculate_expression("require('fs')"),
        Err(ProcessorError::Expression(_))
    );
}

/// Test that saving hands the current collection to the store
#[tokio::test]
async fn test_save_data_uses_store() {
    let mut processor = ProcessorBuilder::new()
        .with_store(|store| {
            store.checkpoint();
            store
                .expect_load()
                .returning(|_| Ok(TestFixtures::users()));
            store
                .expect_save()
                .withf(|path, collection| path == Path::new("saved.json") && collection.len() == 3)
                .returning(|_, _| Ok(()))
                .times(1);
        })
        .build();

    processor.load_data(Path::new("in.json")).await.unwrap();
    processor.save_data(Path::new("saved.json")).await.unwrap();
}

/// Test a write failure is reported as such
#[tokio::test]
async fn test_save_failure() {
    let processor = ProcessorBuilder::new()
        .with_store(|store| {
            store.checkpoint();
            store.expect_save().returning(|path, _| {
                Err(StoreError::Write {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                })
            });
        })
        .build();

    let result = processor.save_data(Path::new("out.json")).await;

    assert_matches!(result, Err(ProcessorError::Store(StoreError::Write { .. })));
}

/// Test the full pipeline against real files
#[tokio::test]
async fn test_pipeline_with_real_files() {
    let dir = TestHelpers::write_temp(TestFixtures::INPUT_FILE, &TestFixtures::collection_json()).await;
    let store = RealFileStore::with_base_dir(dir.path().to_path_buf());
    let mut processor = DataProcessor::new(ProcessorConfig::default(), store);

    let report = processor
        .run_pipeline(
            Path::new(TestFixtures::INPUT_FILE),
            Path::new(TestFixtures::OUTPUT_FILE),
            true,
        )
        .await
        .unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.saved, 2);
    assert!(report.duplicate_ids.is_empty());

    let written = RealFileStore::with_base_dir(dir.path().to_path_buf())
        .load(Path::new(TestFixtures::OUTPUT_FILE))
        .await
        .unwrap();
    let scores: Vec<u64> = written
        .iter()
        .map(|r| r.get("score").and_then(Value::as_u64).unwrap())
        .collect();
    assert_eq!(scores, vec![100, 30]);

    // The processor adopts the transformed records
    assert_eq!(processor.get_record_by_id(&RecordId::from("b")).unwrap().get("score").unwrap(), 30);
}

/// Test that a malformed input stops the pipeline at the load stage
#[tokio::test]
async fn test_pipeline_malformed_input() {
    let dir = TestHelpers::write_temp(TestFixtures::INPUT_FILE, "{ not json").await;
    let store = RealFileStore::with_base_dir(dir.path().to_path_buf());
    let mut processor = DataProcessor::new(ProcessorConfig::default(), store);

    let err = processor
        .run_pipeline(Path::new(TestFixtures::INPUT_FILE), Path::new(TestFixtures::OUTPUT_FILE), false)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Load));
    assert_matches!(err, ProcessorError::Pipeline { source, .. } => {
        assert_matches!(*source, ProcessorError::Store(StoreError::Parse { .. }));
    });
    assert!(!dir.path().join(TestFixtures::OUTPUT_FILE).exists());
}

/// Test that records without ids fail validation and nothing is saved
#[tokio::test]
async fn test_pipeline_validation_failure() {
    let mut records = TestFixtures::users();
    records.records_mut()[1].remove("id");

    let mut processor = ProcessorBuilder::new()
        .with_store(move |store| {
            store.checkpoint();
            store.expect_load().returning(move |_| Ok(records.clone()));
            store.expect_save().times(0);
        })
        .build();

    let err = processor
        .run_pipeline(Path::new("in.json"), Path::new("out.json"), false)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Validate));
}

/// Test that duplicate ids are reported but do not stop the pipeline
#[tokio::test]
async fn test_pipeline_reports_duplicate_ids() {
    let mut processor = ProcessorBuilder::new()
        .with_data(TestFixtures::users_with_duplicate_ids())
        .build();

    let report = processor
        .run_pipeline(Path::new("in.json"), Path::new("out.json"), false)
        .await
        .unwrap();

    assert_eq!(report.duplicate_ids, vec![RecordId::Int(2)]);
    assert_eq!(report.saved, 4);
    assert_eq!(report.transform, "identity");
}

/// Test that the activity log stays within its configured bound
#[tokio::test]
async fn test_activity_log_bounded() {
    let config = ProcessorConfig {
        activity_log_capacity: 5,
        ..ProcessorConfig::default()
    };
    let mut processor = ProcessorBuilder::new()
        .with_config(config)
        .with_data(TestFixtures::users())
        .build();

    for _ in 0..10 {
        processor.load_data(Path::new("in.json")).await.unwrap();
    }

    assert_eq!(processor.activity().len(), 5);
    assert_eq!(processor.activity().evicted_count(), 5);
}

/// Test that each load and save reaches the activity log once with the layer installed
#[tokio::test]
async fn test_activity_layer_does_not_duplicate_entries() {
    let dir = TestHelpers::write_temp(TestFixtures::INPUT_FILE, &TestFixtures::collection_json()).await;
    let activity = ActivityLog::new(16);
    let subscriber = tracing_subscriber::registry().with(ActivityLayer::new(activity.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = RealFileStore::with_base_dir(dir.path().to_path_buf());
    let mut processor = DataProcessor::with_activity_log(ProcessorConfig::default(), store, activity.clone());

    processor.load_data(Path::new(TestFixtures::INPUT_FILE)).await.unwrap();
    processor.save_data(Path::new(TestFixtures::OUTPUT_FILE)).await.unwrap();

    let messages: Vec<String> = activity.entries().into_iter().map(|e| e.message).collect();
    assert_eq!(messages.len(), 2, "{messages:?}");
    assert!(messages[0].starts_with("Loaded 2 records"));
    assert!(messages[1].starts_with("Saved 2 records"));
}
