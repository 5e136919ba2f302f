//! Record lookup by identifier
//!
//! [`find_record`] scans linearly and suits one-off lookups. [`RecordIndex`]
//! pays O(n) once to answer repeated lookups in O(1) average time.

use std::collections::HashMap;
use shared::{Record, RecordId};

use super::duplicates::find_duplicates;

/// First record whose identifier equals `target`, or `None`
pub fn find_record<'a>(records: &'a [Record], target: &RecordId) -> Option<&'a Record> {
    records
        .iter()
        .find(|record| record.id().as_ref() == Some(target))
}

/// Position of the first record whose identifier equals `target`
pub fn position_of(records: &[Record], target: &RecordId) -> Option<usize> {
    records
        .iter()
        .position(|record| record.id().as_ref() == Some(target))
}

/// Identifier to position index over a borrowed slice of records
///
/// When identifiers repeat, the first occurrence wins so that indexed and
/// scanned lookups agree. Records without a valid identifier are skipped.
pub struct RecordIndex<'a> {
    records: &'a [Record],
    positions: HashMap<RecordId, usize>,
    ids_in_order: Vec<RecordId>,
}

impl<'a> RecordIndex<'a> {
    pub fn build(records: &'a [Record]) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        let mut ids_in_order = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            if let Some(id) = record.id() {
                positions.entry(id.clone()).or_insert(position);
                ids_in_order.push(id);
            }
        }

        Self {
            records,
            positions,
            ids_in_order,
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<&'a Record> {
        self.positions.get(id).map(|&position| &self.records[position])
    }

    pub fn position(&self, id: &RecordId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Identifiers carried by more than one record, each reported once
    pub fn duplicate_ids(&self) -> Vec<RecordId> {
        find_duplicates(&self.ids_in_order)
    }
}

/// Owned identifier to position map, kept by long-lived state
///
/// Unlike [`RecordIndex`] this does not borrow the records, so the owner must
/// rebuild it whenever the underlying collection changes.
#[derive(Debug, Default, Clone)]
pub struct PositionIndex {
    positions: HashMap<RecordId, usize>,
}

impl PositionIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if let Some(id) = record.id() {
                positions.entry(id).or_insert(position);
            }
        }
        Self { positions }
    }

    pub fn lookup<'r>(&self, records: &'r [Record], id: &RecordId) -> Option<&'r Record> {
        self.positions
            .get(id)
            .and_then(|&position| records.get(position))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
