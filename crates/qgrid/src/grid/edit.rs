//! Single in-flight text edit of one cell.

use super::error::GridError;
use super::ledger::ModificationLedger;
use super::selection::CellCoord;
use super::value::{format_cell, CellValue};

/// The cell being edited and its working text.
///
/// A fresh edit starts with the whole text selected: the first typed
/// character replaces it and Backspace clears it. Moving the caret drops the
/// selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEdit {
    pub coord: CellCoord,
    pub buffer: String,
    /// Caret position in chars, `0..=buffer.chars().count()`.
    pub cursor: usize,
    pub replace_on_type: bool,
}

impl ActiveEdit {
    fn new(coord: CellCoord, buffer: String) -> Self {
        let cursor = buffer.chars().count();
        Self {
            coord,
            buffer,
            cursor,
            replace_on_type: true,
        }
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_idx)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Clears the text if it is still selected. Returns whether it did.
    fn take_selection(&mut self) -> bool {
        if !self.replace_on_type {
            return false;
        }
        self.replace_on_type = false;
        self.buffer.clear();
        self.cursor = 0;
        true
    }
}

/// Caret movements inside the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    Home,
    End,
}

/// What a commit did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A record was inserted or replaced.
    Modified,
    /// The text matched the original and an earlier record was dropped.
    Reverted,
    /// The text matched the original and there was nothing to drop.
    Unchanged,
}

/// Idle when `active` is `None`, editing otherwise.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    active: Option<ActiveEdit>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        self.active.as_ref()
    }

    pub fn coord(&self) -> Option<CellCoord> {
        self.active.as_ref().map(|a| a.coord)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.buffer.as_str())
    }

    /// Opens an edit on `coord`, seeded from the ledger's pending text when
    /// there is one and from the formatted `current` value otherwise.
    pub fn start(
        &mut self,
        coord: CellCoord,
        current: &CellValue,
        ledger: &ModificationLedger,
    ) -> Result<&ActiveEdit, GridError> {
        if self.active.is_some() {
            return Err(GridError::AlreadyEditing);
        }
        let buffer = match ledger.get(coord) {
            Some(record) => record.new_text.clone(),
            None => format_cell(current),
        };
        Ok(&*self.active.insert(ActiveEdit::new(coord, buffer)))
    }

    /// Replaces the whole text and puts the caret at its end.
    pub fn set_buffer(&mut self, text: impl Into<String>) -> Result<(), GridError> {
        let active = self.active.as_mut().ok_or(GridError::NotEditing)?;
        active.buffer = text.into();
        active.cursor = active.len();
        active.replace_on_type = false;
        Ok(())
    }

    pub fn insert_char(&mut self, ch: char) -> Result<(), GridError> {
        let active = self.active.as_mut().ok_or(GridError::NotEditing)?;
        active.take_selection();
        let at = active.byte_offset(active.cursor);
        active.buffer.insert(at, ch);
        active.cursor += 1;
        Ok(())
    }

    /// Backspace.
    pub fn delete_char(&mut self) -> Result<(), GridError> {
        let active = self.active.as_mut().ok_or(GridError::NotEditing)?;
        if active.take_selection() || active.cursor == 0 {
            return Ok(());
        }
        active.cursor -= 1;
        let at = active.byte_offset(active.cursor);
        active.buffer.remove(at);
        Ok(())
    }

    /// Delete: removes the char under the caret.
    pub fn delete_forward(&mut self) -> Result<(), GridError> {
        let active = self.active.as_mut().ok_or(GridError::NotEditing)?;
        if active.take_selection() || active.cursor == active.len() {
            return Ok(());
        }
        let at = active.byte_offset(active.cursor);
        active.buffer.remove(at);
        Ok(())
    }

    pub fn move_caret(&mut self, movement: CaretMove) -> Result<(), GridError> {
        let active = self.active.as_mut().ok_or(GridError::NotEditing)?;
        let len = active.len();
        // Like a text input: Left/Right on a selection land on its edge.
        let was_selected = std::mem::take(&mut active.replace_on_type);
        active.cursor = match movement {
            CaretMove::Home => 0,
            CaretMove::End => len,
            CaretMove::Left if was_selected => 0,
            CaretMove::Right if was_selected => len,
            CaretMove::Left => active.cursor.saturating_sub(1),
            CaretMove::Right => (active.cursor + 1).min(len),
        };
        Ok(())
    }

    /// Ends the edit and writes the result into the ledger.
    ///
    /// `original` must be the raw value at the edited coordinate.
    pub fn commit(
        &mut self,
        original: &CellValue,
        ledger: &mut ModificationLedger,
    ) -> Result<CommitOutcome, GridError> {
        let ActiveEdit { coord, buffer, .. } = self.active.take().ok_or(GridError::NotEditing)?;
        let had_record = ledger.contains(coord);

        let outcome = if ledger.record_edit(coord, original, buffer) {
            CommitOutcome::Modified
        } else if had_record {
            CommitOutcome::Reverted
        } else {
            CommitOutcome::Unchanged
        };
        tracing::debug!(row = coord.row, col = coord.col, ?outcome, "cell edit committed");
        Ok(outcome)
    }

    /// Drops the edit; the ledger is untouched.
    pub fn cancel(&mut self) -> Result<(), GridError> {
        self.active.take().map(|_| ()).ok_or(GridError::NotEditing)
    }

    /// Drops any edit without reporting an error. Used when the result is replaced.
    pub fn reset(&mut self) {
        self.active = None;
    }
}
