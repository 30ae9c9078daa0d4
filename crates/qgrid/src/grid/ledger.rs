//! Pending cell edits that have not been persisted anywhere.

use std::collections::BTreeMap;

use super::selection::CellCoord;
use super::value::{format_cell, CellValue};

/// A committed edit for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationRecord {
    pub original: CellValue,
    pub new_text: String,
}

/// Map from coordinate to pending edit.
///
/// Invariant: a record exists for a cell only while its text differs from the
/// formatted original. [`ModificationLedger::record_edit`] maintains this;
/// [`ModificationLedger::set`] is the raw insert.
#[derive(Debug, Clone, Default)]
pub struct ModificationLedger {
    records: BTreeMap<CellCoord, ModificationRecord>,
}

impl ModificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: CellCoord) -> Option<&ModificationRecord> {
        self.records.get(&coord)
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.records.contains_key(&coord)
    }

    pub fn set(&mut self, coord: CellCoord, record: ModificationRecord) {
        self.records.insert(coord, record);
    }

    pub fn remove(&mut self, coord: CellCoord) -> Option<ModificationRecord> {
        self.records.remove(&coord)
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by (row, col).
    pub fn iter(&self) -> impl Iterator<Item = (&CellCoord, &ModificationRecord)> {
        self.records.iter()
    }

    /// Stores `new_text` for `coord`, or drops the record when the text is
    /// the original's canonical form. Returns whether a record remains.
    pub fn record_edit(&mut self, coord: CellCoord, original: &CellValue, new_text: String) -> bool {
        if new_text == format_cell(original) {
            self.records.remove(&coord);
            false
        } else {
            self.records.insert(
                coord,
                ModificationRecord {
                    original: original.clone(),
                    new_text,
                },
            );
            true
        }
    }

    /// Text a cell should show: the pending edit if any, else the original.
    pub fn display_text(&self, coord: CellCoord, raw: &CellValue) -> String {
        match self.records.get(&coord) {
            Some(record) => record.new_text.clone(),
            None => format_cell(raw),
        }
    }
}
