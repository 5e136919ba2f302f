//! Data processor state object
//!
//! Owns the in-memory collection, the activity log and the configuration,
//! and is constructed explicitly by the caller with its record store.

use std::collections::HashMap;
use std::path::Path;
use serde_json::Value;
use shared::{ActivityLog, Collection, Record, RecordId};

use crate::config::ProcessorConfig;
use crate::core::duplicates::{find_duplicate_pairs, find_duplicates};
use crate::core::expression;
use crate::core::lookup::PositionIndex;
use crate::core::scoring::{ScoreInput, Scorer};
use crate::error::ProcessorResult;
use crate::pipeline::{Identity, Pipeline, PipelineReport, ScoreAnnotator};
use crate::traits::RecordStore;

/// How repeated values are reported by [`DataProcessor::find_duplicates`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateMode {
    /// Each repeated value once
    #[default]
    Distinct,
    /// Once per equal pair
    Pairs,
}

pub struct DataProcessor<S: RecordStore> {
    config: ProcessorConfig,
    store: S,
    activity: ActivityLog,
    scorer: Scorer,
    data: Collection,
    // Rebuilt lazily after any mutation of `data`
    index: Option<PositionIndex>,
}

impl<S: RecordStore> DataProcessor<S> {
    pub fn new(config: ProcessorConfig, store: S) -> Self {
        let activity = ActivityLog::new(config.activity_log_capacity);
        Self::with_activity_log(config, store, activity)
    }

    /// Use an existing activity log, e.g. one shared with the tracing layer
    pub fn with_activity_log(config: ProcessorConfig, store: S, activity: ActivityLog) -> Self {
        let scorer = Scorer::new(config.scoring);
        Self {
            config,
            store,
            activity,
            scorer,
            data: Collection::new(),
            index: None,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn records(&self) -> &[Record] {
        self.data.records()
    }

    pub fn collection(&self) -> &Collection {
        &self.data
    }

    pub fn replace_records(&mut self, collection: Collection) {
        self.data = collection;
        self.index = None;
    }

    pub fn push_record(&mut self, record: Record) {
        self.data.push(record);
        self.index = None;
    }

    /// Record a timestamped activity message
    pub fn log_activity(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.activity.record("INFO", message);
    }

    /// Replace the in-memory collection with the content of `path`
    pub async fn load_data(&mut self, path: &Path) -> ProcessorResult<usize> {
        let collection = self.store.load(path).await?;
        let count = collection.len();
        self.replace_records(collection);
        self.log_activity(format!("Loaded {count} records from {}", path.display()));
        Ok(count)
    }

    /// Load from the configured data file
    pub async fn load_default(&mut self) -> ProcessorResult<usize> {
        let path = self.config.data_file.clone();
        self.load_data(&path).await
    }

    pub async fn save_data(&self, path: &Path) -> ProcessorResult<()> {
        self.store.save(path, &self.data).await?;
        self.log_activity(format!("Saved {} records to {}", self.data.len(), path.display()));
        Ok(())
    }

    /// Save to the configured output file
    pub async fn save_default(&self) -> ProcessorResult<()> {
        self.save_data(&self.config.output_file).await
    }

    /// Repeated values of `field` across the collection
    ///
    /// Records lacking the field are ignored.
    pub fn find_duplicates(&self, field: &str, mode: DuplicateMode) -> Vec<Value> {
        // JSON values are not hashable; compare their canonical serialization
        let mut originals: HashMap<String, Value> = HashMap::new();
        let keys: Vec<String> = self
            .data
            .field_values(field)
            .into_iter()
            .map(|value| {
                let key = value.to_string();
                originals.entry(key.clone()).or_insert(value);
                key
            })
            .collect();

        let repeated = match mode {
            DuplicateMode::Distinct => find_duplicates(&keys),
            DuplicateMode::Pairs => find_duplicate_pairs(&keys),
        };

        repeated
            .into_iter()
            .filter_map(|key| originals.get(&key).cloned())
            .collect()
    }

    /// First record with identifier `id`, via the lookup index
    pub fn get_record_by_id(&mut self, id: &RecordId) -> Option<&Record> {
        let records = self.data.records();
        let index = self
            .index
            .get_or_insert_with(|| PositionIndex::build(records));
        index.lookup(records, id)
    }

    pub fn calculate_score(&self, input: &ScoreInput) -> u32 {
        self.scorer.score(input)
    }

    pub fn score_record(&self, record: &Record) -> ProcessorResult<u32> {
        Ok(self.scorer.score_record(record)?)
    }

    /// Score of the record with identifier `id`; `None` when there is no such record
    pub fn score_by_id(&mut self, id: &RecordId) -> Option<ProcessorResult<u32>> {
        let scorer = self.scorer.clone();
        self.get_record_by_id(id)
            .map(|record| scorer.score_record(record).map_err(Into::into))
    }

    /// Evaluate an arithmetic expression without executing any code
    pub fn calculate_expression(&self, input: &str) -> ProcessorResult<f64> {
        Ok(expression::evaluate(input)?)
    }

    /// Load, validate, transform and save; the transformed records become
    /// the in-memory collection on success
    pub async fn run_pipeline(
        &mut self,
        input: &Path,
        output: &Path,
        annotate_scores: bool,
    ) -> ProcessorResult<PipelineReport> {
        let pipeline = Pipeline::new(&self.store, &self.activity);
        let (collection, report) = if annotate_scores {
            pipeline
                .run(input, output, &ScoreAnnotator::new(self.config.scoring))
                .await?
        } else {
            pipeline.run(input, output, &Identity).await?
        };

        self.replace_records(collection);
        Ok(report)
    }
}
