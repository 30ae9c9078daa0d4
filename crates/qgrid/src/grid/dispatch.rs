//! Routes pointer and keyboard input into the selection, edit session,
//! ledger and copy machinery for the currently loaded result.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::copy::{serialize_selection, CopiedMarkers};
use super::edit::{CaretMove, CommitOutcome, EditSession};
use super::error::GridError;
use super::ledger::ModificationLedger;
use super::result::{GridView, ResultSet};
use super::selection::{CellCoord, Selection};
use super::value::CellValue;
use crate::config::{Action, Keymap};

pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(250);

/// Rows moved by PageUp/PageDown.
const PAGE_ROWS: usize = 10;

/// Maps a logical cell to whatever UI handle can take focus for it.
pub trait FocusProxy {
    fn focus_element(&mut self, coord: CellCoord);
}

/// Side effects the grid asks of its surroundings.
pub trait GridHost: FocusProxy {
    /// Write text to the system clipboard.
    fn write_clipboard(&mut self, text: &str) -> Result<()>;

    /// The user asked to filter the query by `column = value`.
    fn add_where_clause(&mut self, column: &str, value: &CellValue);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Navigating,
    /// Primary button held after a press on a cell.
    Dragging,
    Editing,
}

/// Focus transfer to perform once the current frame has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    EditInput(CellCoord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press {
        coord: CellCoord,
        button: PointerButton,
        shift: bool,
        at: Instant,
    },
    /// Pointer is over `coord`.
    Move { coord: CellCoord },
    /// Button released anywhere, inside the grid or not.
    Release,
}

/// What an input did, for the caller's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKeyResult {
    Handled,
    Ignored,
    Copied { rows: usize, cols: usize },
    Committed(CommitOutcome),
    Quit,
}

/// Highlight to draw for a cell, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellHighlight {
    Editing,
    Copied,
    /// Focus cell of a multi-cell selection.
    Focus,
    Selected,
    Modified,
    None,
}

/// The results grid: one result plus all interaction state bound to it.
#[derive(Debug)]
pub struct ResultsGrid {
    view: GridView,
    selection: Selection,
    ledger: ModificationLedger,
    edit: EditSession,
    copied: CopiedMarkers,
    keymap: Keymap,
    drag_armed: bool,
    last_press: Option<(CellCoord, Instant)>,
    double_click_window: Duration,
    deferred_focus: Option<FocusRequest>,
}

impl Default for ResultsGrid {
    fn default() -> Self {
        Self::new(Keymap::default_grid_keymap(), DEFAULT_DOUBLE_CLICK_WINDOW)
    }
}

impl ResultsGrid {
    pub fn new(keymap: Keymap, double_click_window: Duration) -> Self {
        Self {
            view: GridView::NoResult,
            selection: Selection::new(),
            ledger: ModificationLedger::new(),
            edit: EditSession::new(),
            copied: CopiedMarkers::new(),
            keymap,
            drag_armed: false,
            last_press: None,
            double_click_window,
            deferred_focus: None,
        }
    }

    // ---- inbound result lifecycle ----

    /// Replaces the result. Selection, edit, ledger and markers start over.
    pub fn set_result(&mut self, result: ResultSet) {
        tracing::debug!(
            rows = result.row_count(),
            cols = result.col_count(),
            rows_affected = ?result.rows_affected,
            "loading result"
        );
        self.reset_interaction();
        self.view = GridView::Loaded(result);
    }

    pub fn set_executing(&mut self) {
        self.reset_interaction();
        self.view = GridView::Executing;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.reset_interaction();
        self.view = GridView::Failed(message.into());
    }

    pub fn clear(&mut self) {
        self.reset_interaction();
        self.view = GridView::NoResult;
    }

    fn reset_interaction(&mut self) {
        self.selection.clear();
        self.edit.reset();
        self.ledger.clear_all();
        self.copied.clear();
        self.drag_armed = false;
        self.last_press = None;
        self.deferred_focus = None;
    }

    // ---- read access for rendering ----

    pub fn view(&self) -> &GridView {
        &self.view
    }

    /// The loaded table, if there is one.
    pub fn result(&self) -> Option<&ResultSet> {
        self.view.table()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn ledger(&self) -> &ModificationLedger {
        &self.ledger
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn copied(&self) -> &CopiedMarkers {
        &self.copied
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn mode(&self) -> InteractionMode {
        if self.edit.is_editing() {
            InteractionMode::Editing
        } else if self.drag_armed {
            InteractionMode::Dragging
        } else {
            InteractionMode::Navigating
        }
    }

    /// Ledger-aware text for a cell.
    pub fn display_text(&self, coord: CellCoord) -> Option<String> {
        let raw = self.result()?.value(coord)?;
        Some(self.ledger.display_text(coord, raw))
    }

    /// The value a filter on this cell should use: pending text if edited.
    pub fn effective_value(&self, coord: CellCoord) -> Option<CellValue> {
        let raw = self.result()?.value(coord)?;
        Some(match self.ledger.get(coord) {
            Some(record) => CellValue::Text(record.new_text.clone()),
            None => raw.clone(),
        })
    }

    pub fn highlight(&self, coord: CellCoord) -> CellHighlight {
        if self.edit.coord() == Some(coord) {
            CellHighlight::Editing
        } else if self.copied.contains(coord) {
            CellHighlight::Copied
        } else if self.selection.is_focus(coord) && self.selection.is_multi_cell() {
            CellHighlight::Focus
        } else if self.selection.contains(coord) {
            CellHighlight::Selected
        } else if self.ledger.contains(coord) {
            CellHighlight::Modified
        } else {
            CellHighlight::None
        }
    }

    /// Takes the pending post-render focus transfer, if any.
    pub fn take_deferred_focus(&mut self) -> Option<FocusRequest> {
        self.deferred_focus.take()
    }

    /// Expires copy highlights. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.copied.expire(now)
    }

    // ---- bounds-checked engine operations ----

    fn dimensions(&self) -> Result<(usize, usize), GridError> {
        if !self.view.is_interactive() {
            return Err(GridError::NotInteractive);
        }
        let rs = self.result().ok_or(GridError::NotInteractive)?;
        Ok((rs.row_count(), rs.col_count()))
    }

    fn check(&self, coord: CellCoord) -> Result<(), GridError> {
        let (rows, cols) = self.dimensions()?;
        if coord.row < rows && coord.col < cols {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                rows,
                cols,
            })
        }
    }

    fn clamp(&self, coord: CellCoord) -> Result<CellCoord, GridError> {
        let (rows, cols) = self.dimensions()?;
        Ok(CellCoord::new(coord.row.min(rows - 1), coord.col.min(cols - 1)))
    }

    pub fn select_cell(&mut self, coord: CellCoord) -> Result<(), GridError> {
        self.check(coord)?;
        self.selection.select_cell(coord);
        Ok(())
    }

    pub fn extend_selection(&mut self, coord: CellCoord) -> Result<(), GridError> {
        self.check(coord)?;
        self.selection.extend_selection(coord);
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<(), GridError> {
        let (rows, cols) = self.dimensions()?;
        self.selection.select_all(rows, cols);
        Ok(())
    }

    /// Opens an editor on `coord`. Ends any drag in progress.
    pub fn start_editing(&mut self, coord: CellCoord) -> Result<(), GridError> {
        self.check(coord)?;
        let rs = self.view.table().ok_or(GridError::NotInteractive)?;
        let current = rs.value(coord).ok_or(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
            rows: rs.row_count(),
            cols: rs.col_count(),
        })?;
        self.edit.start(coord, current, &self.ledger)?;
        self.drag_armed = false;
        self.last_press = None;
        self.deferred_focus = Some(FocusRequest::EditInput(coord));
        Ok(())
    }

    pub fn set_edit_buffer(&mut self, text: impl Into<String>) -> Result<(), GridError> {
        self.edit.set_buffer(text)
    }

    pub fn commit_edit(&mut self) -> Result<CommitOutcome, GridError> {
        let coord = self.edit.coord().ok_or(GridError::NotEditing)?;
        let rs = self.view.table().ok_or(GridError::NotInteractive)?;
        let original = rs.value(coord).ok_or(GridError::OutOfBounds {
            row: coord.row,
            col: coord.col,
            rows: rs.row_count(),
            cols: rs.col_count(),
        })?;
        self.edit.commit(original, &mut self.ledger)
    }

    pub fn cancel_edit(&mut self) -> Result<(), GridError> {
        self.edit.cancel()
    }

    /// Commits, then opens the neighbouring column in the same row if there
    /// is one. Never wraps to another row.
    pub fn commit_and_advance(&mut self, forward: bool) -> Result<CommitOutcome, GridError> {
        let coord = self.edit.coord().ok_or(GridError::NotEditing)?;
        let outcome = self.commit_edit()?;
        let (_, cols) = self.dimensions()?;

        let next_col = if forward {
            Some(coord.col + 1).filter(|c| *c < cols)
        } else {
            coord.col.checked_sub(1)
        };
        if let Some(col) = next_col {
            self.start_editing(CellCoord::new(coord.row, col))?;
        }
        Ok(outcome)
    }

    /// Copies the selection through the host. A failed write is logged and
    /// leaves no highlight. Returns the copied rectangle size on success.
    pub fn copy_selection(&mut self, host: &mut impl GridHost, now: Instant) -> Option<(usize, usize)> {
        let bounds = self.selection.bounds()?;
        let rs = self.view.table()?;
        let text = serialize_selection(bounds, rs, &self.ledger);

        match host.write_clipboard(&text) {
            Ok(()) => {
                self.copied.mark(bounds, now);
                Some((bounds.row_count(), bounds.col_count()))
            }
            Err(e) => {
                tracing::warn!("clipboard write failed: {:#}", e);
                None
            }
        }
    }

    /// Sends the focused cell's column and effective value to the host.
    pub fn add_where_clause(&self, host: &mut impl GridHost) -> bool {
        let Some(focus) = self.selection.focus() else {
            return false;
        };
        let Some(column) = self.result().and_then(|rs| rs.column_name(focus.col)) else {
            return false;
        };
        let Some(value) = self.effective_value(focus) else {
            return false;
        };
        host.add_where_clause(column, &value);
        true
    }

    // ---- input dispatch ----

    pub fn handle_key(&mut self, key: KeyEvent, host: &mut impl GridHost) -> GridKeyResult {
        if !self.view.is_interactive() {
            return GridKeyResult::Ignored;
        }
        if self.edit.is_editing() {
            self.handle_edit_key(key)
        } else {
            self.handle_navigation_key(key, host)
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> GridKeyResult {
        let result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.commit_edit().map(GridKeyResult::Committed),
            (KeyCode::Esc, _) => self.cancel_edit().map(|_| GridKeyResult::Handled),
            (KeyCode::BackTab, _) => self.commit_and_advance(false).map(GridKeyResult::Committed),
            (KeyCode::Tab, m) => self
                .commit_and_advance(!m.contains(KeyModifiers::SHIFT))
                .map(GridKeyResult::Committed),
            (KeyCode::Backspace, _) => self.edit.delete_char().map(|_| GridKeyResult::Handled),
            (KeyCode::Delete, _) => self.edit.delete_forward().map(|_| GridKeyResult::Handled),
            (KeyCode::Left, _) => self.move_caret(CaretMove::Left),
            (KeyCode::Right, _) => self.move_caret(CaretMove::Right),
            (KeyCode::Home, _) => self.move_caret(CaretMove::Home),
            (KeyCode::End, _) => self.move_caret(CaretMove::End),
            (KeyCode::Char(ch), m)
                if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER) =>
            {
                self.edit.insert_char(ch).map(|_| GridKeyResult::Handled)
            }
            _ => Ok(GridKeyResult::Ignored),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("edit key rejected: {}", e);
            GridKeyResult::Ignored
        })
    }

    fn move_caret(&mut self, movement: CaretMove) -> Result<GridKeyResult, GridError> {
        self.edit.move_caret(movement)?;
        Ok(GridKeyResult::Handled)
    }

    /// Looks the key up as-is first, so bindings that include Shift (like
    /// "G") win. Otherwise Shift plus a movement key extends the selection.
    fn resolve_action(&self, key: &KeyEvent) -> Option<(Action, bool)> {
        if let Some(action) = self.keymap.get_action(key) {
            return Some((action, false));
        }
        if !key.modifiers.contains(KeyModifiers::SHIFT) {
            return None;
        }
        let plain = KeyEvent::new(key.code, key.modifiers - KeyModifiers::SHIFT);
        self.keymap
            .get_action(&plain)
            .filter(Action::is_movement)
            .map(|action| (action, true))
    }

    fn handle_navigation_key(&mut self, key: KeyEvent, host: &mut impl GridHost) -> GridKeyResult {
        let Some((action, extend)) = self.resolve_action(&key) else {
            return GridKeyResult::Ignored;
        };

        if action.is_movement() {
            return self.move_focus(action, extend, host);
        }

        match action {
            Action::CollapseSelection => {
                self.selection.collapse_to_focus();
                GridKeyResult::Handled
            }
            Action::GridSelectAll => {
                if self.select_all().is_err() {
                    return GridKeyResult::Ignored;
                }
                if let Some(focus) = self.selection.focus() {
                    host.focus_element(focus);
                }
                GridKeyResult::Handled
            }
            Action::EditCell => match self.selection.focus() {
                Some(focus) => match self.start_editing(focus) {
                    Ok(()) => GridKeyResult::Handled,
                    Err(e) => {
                        tracing::warn!("could not start editing: {}", e);
                        GridKeyResult::Ignored
                    }
                },
                None => GridKeyResult::Ignored,
            },
            Action::CopySelection => {
                if self.selection.is_empty() {
                    return GridKeyResult::Ignored;
                }
                match self.copy_selection(host, Instant::now()) {
                    Some((rows, cols)) => GridKeyResult::Copied { rows, cols },
                    None => GridKeyResult::Handled,
                }
            }
            Action::AddWhereClause => {
                if self.add_where_clause(host) {
                    GridKeyResult::Handled
                } else {
                    GridKeyResult::Ignored
                }
            }
            Action::Quit => GridKeyResult::Quit,
            _ => GridKeyResult::Ignored,
        }
    }

    fn move_focus(&mut self, action: Action, extend: bool, host: &mut impl GridHost) -> GridKeyResult {
        let Ok((rows, cols)) = self.dimensions() else {
            return GridKeyResult::Ignored;
        };

        let Some(focus) = self.selection.focus() else {
            // First keyboard interaction lands on the top-left cell.
            let origin = CellCoord::new(0, 0);
            self.selection.select_cell(origin);
            host.focus_element(origin);
            return GridKeyResult::Handled;
        };

        let last_row = rows - 1;
        let last_col = cols - 1;
        let next = match action {
            Action::MoveUp => CellCoord::new(focus.row.saturating_sub(1), focus.col),
            Action::MoveDown => CellCoord::new((focus.row + 1).min(last_row), focus.col),
            Action::MoveLeft => CellCoord::new(focus.row, focus.col.saturating_sub(1)),
            Action::MoveRight => CellCoord::new(focus.row, (focus.col + 1).min(last_col)),
            Action::PageUp => CellCoord::new(focus.row.saturating_sub(PAGE_ROWS), focus.col),
            Action::PageDown => CellCoord::new((focus.row + PAGE_ROWS).min(last_row), focus.col),
            Action::MoveToTop => CellCoord::new(0, focus.col),
            Action::MoveToBottom => CellCoord::new(last_row, focus.col),
            Action::MoveToStart => CellCoord::new(focus.row, 0),
            Action::MoveToEnd => CellCoord::new(focus.row, last_col),
            _ => return GridKeyResult::Ignored,
        };

        if extend {
            self.selection.extend_selection(next);
        } else {
            self.selection.select_cell(next);
        }
        host.focus_element(next);
        GridKeyResult::Handled
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, host: &mut impl GridHost) -> GridKeyResult {
        if let PointerEvent::Release = event {
            let was_dragging = self.drag_armed;
            self.drag_armed = false;
            return if was_dragging {
                GridKeyResult::Handled
            } else {
                GridKeyResult::Ignored
            };
        }
        if !self.view.is_interactive() {
            return GridKeyResult::Ignored;
        }

        match event {
            PointerEvent::Press {
                coord,
                button,
                shift,
                at,
            } => {
                if button != PointerButton::Primary {
                    return GridKeyResult::Ignored;
                }
                let Ok(coord) = self.clamp(coord) else {
                    return GridKeyResult::Ignored;
                };

                // Pressing elsewhere takes focus from the editor, which commits it.
                let committed = if self.edit.is_editing() {
                    self.blur()
                } else {
                    None
                };

                let is_double = !shift
                    && self.last_press.is_some_and(|(prev, t)| {
                        prev == coord && at.saturating_duration_since(t) <= self.double_click_window
                    });
                if is_double {
                    return match (self.double_click(coord), committed) {
                        (GridKeyResult::Handled, Some(outcome)) => GridKeyResult::Committed(outcome),
                        (result, _) => result,
                    };
                }

                if shift && !self.selection.is_empty() {
                    self.selection.extend_selection(coord);
                    self.last_press = None;
                } else {
                    self.selection.select_cell(coord);
                    self.last_press = Some((coord, at));
                }
                self.drag_armed = true;
                host.focus_element(coord);

                match committed {
                    Some(outcome) => GridKeyResult::Committed(outcome),
                    None => GridKeyResult::Handled,
                }
            }
            PointerEvent::Move { coord } => {
                if !self.drag_armed {
                    return GridKeyResult::Ignored;
                }
                let Ok(coord) = self.clamp(coord) else {
                    return GridKeyResult::Ignored;
                };
                if self.selection.focus() == Some(coord) {
                    return GridKeyResult::Ignored;
                }
                self.selection.extend_selection(coord);
                GridKeyResult::Handled
            }
            PointerEvent::Release => GridKeyResult::Ignored,
        }
    }

    /// Double activation: open the editor directly on `coord`. An edit
    /// already open elsewhere is committed first and its outcome reported.
    pub fn double_click(&mut self, coord: CellCoord) -> GridKeyResult {
        let committed = self.blur();
        match (self.start_editing(coord), committed) {
            (Ok(()), Some(outcome)) => GridKeyResult::Committed(outcome),
            (Ok(()), None) => GridKeyResult::Handled,
            (Err(e), committed) => {
                tracing::debug!("double click ignored: {}", e);
                committed.map_or(GridKeyResult::Ignored, GridKeyResult::Committed)
            }
        }
    }

    /// The editor lost focus: commit whatever is in it.
    pub fn blur(&mut self) -> Option<CommitOutcome> {
        if !self.edit.is_editing() {
            return None;
        }
        match self.commit_edit() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("commit on blur failed: {}", e);
                self.edit.reset();
                None
            }
        }
    }
}
