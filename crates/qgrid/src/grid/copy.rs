//! Turning a selected rectangle into clipboard text, and the brief
//! highlight shown on the cells that were copied.

use std::time::{Duration, Instant};

use super::ledger::ModificationLedger;
use super::result::ResultSet;
use super::selection::{CellCoord, SelectionBounds};

/// How long copied cells stay highlighted.
pub const COPY_FLASH_DURATION: Duration = Duration::from_millis(600);

/// Tab-separated columns, newline-separated rows, using pending edits where present.
pub fn serialize_selection(
    bounds: SelectionBounds,
    result: &ResultSet,
    ledger: &ModificationLedger,
) -> String {
    let mut lines = Vec::with_capacity(bounds.row_count());
    for row in bounds.min_row..=bounds.max_row {
        let mut fields = Vec::with_capacity(bounds.col_count());
        for col in bounds.min_col..=bounds.max_col {
            let coord = CellCoord::new(row, col);
            let text = match result.value(coord) {
                Some(raw) => ledger.display_text(coord, raw),
                None => String::new(),
            };
            fields.push(text);
        }
        lines.push(fields.join("\t"));
    }
    lines.join("\n")
}

/// Cells highlighted after a copy. Cleared as a whole once the window lapses;
/// a new copy replaces the set and restarts the window.
#[derive(Debug, Clone, Default)]
pub struct CopiedMarkers {
    marked: Option<(SelectionBounds, Instant)>,
}

impl CopiedMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, bounds: SelectionBounds, now: Instant) {
        self.marked = Some((bounds, now + COPY_FLASH_DURATION));
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.marked.is_some_and(|(bounds, _)| bounds.contains(coord))
    }

    pub fn is_active(&self) -> bool {
        self.marked.is_some()
    }

    /// Drops the highlight once its window has passed. Returns true if it did.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.marked {
            Some((_, deadline)) if now >= deadline => {
                self.marked = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.marked = None;
    }
}
