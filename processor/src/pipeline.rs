//! Load, validate, transform and save, as sequential stages
//!
//! Each stage returns a `Result`; the run stops at the first failing stage
//! and reports which one it was. Nothing is saved unless every earlier
//! stage succeeded.

use std::path::Path;
use shared::{ActivityLog, Collection, Record, RecordId, ID_FIELD};

use crate::core::duplicates::find_duplicates;
use crate::core::scoring::{Scorer, ScoringRules};
use crate::error::{PipelineStage, ProcessorError, ProcessorResult, ValidationError};
use crate::traits::{RecordStore, Transform};

/// Field written by [`ScoreAnnotator`]
pub const SCORE_FIELD: &str = "score";

/// Summary of a completed pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub loaded: usize,
    pub saved: usize,
    pub duplicate_ids: Vec<RecordId>,
    pub transform: String,
}

/// Leaves records untouched
pub struct Identity;

impl Transform for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply(&self, record: Record) -> Result<Record, ValidationError> {
        Ok(record)
    }
}

/// Adds a `score` field computed from the record's score attributes
pub struct ScoreAnnotator {
    scorer: Scorer,
}

impl ScoreAnnotator {
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            scorer: Scorer::new(rules),
        }
    }
}

impl Transform for ScoreAnnotator {
    fn name(&self) -> &str {
        "score"
    }

    fn apply(&self, mut record: Record) -> Result<Record, ValidationError> {
        let score = self.scorer.score_record(&record)?;
        record.insert(SCORE_FIELD, score);
        Ok(record)
    }
}

/// Check every record carries a usable identifier
///
/// Repeated identifiers are returned rather than rejected: uniqueness is
/// expected but not enforced.
pub fn validate_collection(collection: &Collection) -> Result<Vec<RecordId>, ValidationError> {
    let mut ids = Vec::with_capacity(collection.len());

    for (index, record) in collection.iter().enumerate() {
        match record.get(ID_FIELD) {
            None => return Err(ValidationError::missing(ID_FIELD).at(index)),
            Some(value) => match RecordId::from_value(value) {
                Some(id) => ids.push(id),
                None => {
                    return Err(ValidationError::invalid(
                        ID_FIELD,
                        format!("expected an integer or string, found {value}"),
                    )
                    .at(index))
                }
            },
        }
    }

    Ok(find_duplicates(&ids))
}

/// Apply a transform to every record, stopping at the first failure
pub fn transform_collection(
    collection: Collection,
    transform: &dyn Transform,
) -> Result<Collection, ValidationError> {
    collection
        .into_records()
        .into_iter()
        .enumerate()
        .map(|(index, record)| transform.apply(record).map_err(|e| e.at(index)))
        .collect()
}

pub struct Pipeline<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    activity: &'a ActivityLog,
}

impl<'a, S: RecordStore + ?Sized> Pipeline<'a, S> {
    pub fn new(store: &'a S, activity: &'a ActivityLog) -> Self {
        Self { store, activity }
    }

    fn note(&self, message: String) {
        tracing::info!("{}", message);
        self.activity.record("INFO", message);
    }

    pub async fn load(&self, input: &Path) -> ProcessorResult<Collection> {
        let collection = self
            .store
            .load(input)
            .await
            .map_err(|e| ProcessorError::in_stage(PipelineStage::Load, e))?;
        self.note(format!("load: {} records from {}", collection.len(), input.display()));
        Ok(collection)
    }

    pub fn validate(&self, collection: &Collection) -> ProcessorResult<Vec<RecordId>> {
        let duplicate_ids = validate_collection(collection)
            .map_err(|e| ProcessorError::in_stage(PipelineStage::Validate, e))?;

        if !duplicate_ids.is_empty() {
            tracing::warn!(count = duplicate_ids.len(), "Duplicate record identifiers found");
        }
        self.note(format!(
            "validate: {} records, {} duplicate ids",
            collection.len(),
            duplicate_ids.len()
        ));
        Ok(duplicate_ids)
    }

    pub fn transform(&self, collection: Collection, transform: &dyn Transform) -> ProcessorResult<Collection> {
        let transformed = transform_collection(collection, transform)
            .map_err(|e| ProcessorError::in_stage(PipelineStage::Transform, e))?;
        self.note(format!("transform: applied '{}' to {} records", transform.name(), transformed.len()));
        Ok(transformed)
    }

    pub async fn save(&self, output: &Path, collection: &Collection) -> ProcessorResult<()> {
        self.store
            .save(output, collection)
            .await
            .map_err(|e| ProcessorError::in_stage(PipelineStage::Save, e))?;
        self.note(format!("save: {} records to {}", collection.len(), output.display()));
        Ok(())
    }

    /// Run all four stages in order
    pub async fn run(
        &self,
        input: &Path,
        output: &Path,
        transform: &dyn Transform,
    ) -> ProcessorResult<(Collection, PipelineReport)> {
        let loaded = self.load(input).await?;
        let loaded_count = loaded.len();
        let duplicate_ids = self.validate(&loaded)?;
        let transformed = self.transform(loaded, transform)?;
        self.save(output, &transformed).await?;

        let report = PipelineReport {
            loaded: loaded_count,
            saved: transformed.len(),
            duplicate_ids,
            transform: transform.name().to_string(),
        };
        Ok((transformed, report))
    }
}
