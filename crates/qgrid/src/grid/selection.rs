//! Rectangular anchor/focus selection over the results grid.

/// Zero-based (row, column) position in the loaded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Anchor stays put while the focus moves; the rectangle spans both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub anchor: CellCoord,
    pub focus: CellCoord,
}

impl SelectionRange {
    pub fn single(coord: CellCoord) -> Self {
        Self {
            anchor: coord,
            focus: coord,
        }
    }

    pub fn bounds(&self) -> SelectionBounds {
        SelectionBounds {
            min_row: self.anchor.row.min(self.focus.row),
            max_row: self.anchor.row.max(self.focus.row),
            min_col: self.anchor.col.min(self.focus.col),
            max_col: self.anchor.col.max(self.focus.col),
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Inclusive rectangle derived from a [`SelectionRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBounds {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl SelectionBounds {
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.min_row
            && coord.row <= self.max_row
            && coord.col >= self.min_col
            && coord.col <= self.max_col
    }

    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// All coordinates in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| CellCoord { row, col }))
    }
}

/// Selection state. Absent until the first pointer or keyboard interaction.
///
/// Callers clamp coordinates to the grid before calling in; nothing here
/// knows the grid dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<SelectionRange>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<SelectionRange> {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    pub fn select_cell(&mut self, coord: CellCoord) {
        self.range = Some(SelectionRange::single(coord));
    }

    /// Moves the focus, keeping the anchor. Does nothing without a selection.
    pub fn extend_selection(&mut self, coord: CellCoord) {
        if let Some(range) = self.range.as_mut() {
            range.focus = coord;
        }
    }

    pub fn select_all(&mut self, row_count: usize, col_count: usize) {
        if row_count == 0 || col_count == 0 {
            return;
        }
        self.range = Some(SelectionRange {
            anchor: CellCoord::new(0, 0),
            focus: CellCoord::new(row_count - 1, col_count - 1),
        });
    }

    pub fn focus(&self) -> Option<CellCoord> {
        self.range.map(|r| r.focus)
    }

    pub fn anchor(&self) -> Option<CellCoord> {
        self.range.map(|r| r.anchor)
    }

    pub fn bounds(&self) -> Option<SelectionBounds> {
        self.range.map(|r| r.bounds())
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.bounds().is_some_and(|b| b.contains(coord))
    }

    pub fn is_focus(&self, coord: CellCoord) -> bool {
        self.focus() == Some(coord)
    }

    pub fn is_multi_cell(&self) -> bool {
        self.range.is_some_and(|r| !r.is_single_cell())
    }

    /// Re-selects just the focus cell.
    pub fn collapse_to_focus(&mut self) {
        if let Some(focus) = self.focus() {
            self.select_cell(focus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> CellCoord {
        CellCoord::new(row, col)
    }

    #[test]
    fn test_selection_starts_absent() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(sel.bounds(), None);
        assert!(!sel.contains(c(0, 0)));
        assert!(!sel.is_multi_cell());
    }

    #[test]
    fn test_select_cell_is_single() {
        let mut sel = Selection::new();
        sel.select_cell(c(2, 3));
        assert!(!sel.is_multi_cell());
        assert!(sel.is_focus(c(2, 3)));
        assert_eq!(sel.anchor(), Some(c(2, 3)));
        assert_eq!(
            sel.bounds(),
            Some(SelectionBounds {
                min_row: 2,
                max_row: 2,
                min_col: 3,
                max_col: 3
            })
        );
    }

    #[test]
    fn test_extend_keeps_anchor_and_normalizes_bounds() {
        let mut sel = Selection::new();
        sel.select_cell(c(3, 3));
        sel.extend_selection(c(1, 0));

        assert_eq!(sel.anchor(), Some(c(3, 3)));
        assert_eq!(sel.focus(), Some(c(1, 0)));
        assert!(sel.is_multi_cell());

        let b = sel.bounds().unwrap();
        assert_eq!((b.min_row, b.max_row, b.min_col, b.max_col), (1, 3, 0, 3));
        assert!(sel.contains(c(2, 2)));
        assert!(!sel.contains(c(0, 2)));
        assert!(!sel.contains(c(2, 4)));
    }

    #[test]
    fn test_extend_without_selection_is_noop() {
        let mut sel = Selection::new();
        sel.extend_selection(c(1, 1));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_select_all() {
        let mut sel = Selection::new();
        sel.select_all(4, 3);
        assert_eq!(sel.anchor(), Some(c(0, 0)));
        assert_eq!(sel.focus(), Some(c(3, 2)));

        let mut empty = Selection::new();
        empty.select_all(0, 3);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_collapse_to_focus() {
        let mut sel = Selection::new();
        sel.select_cell(c(0, 0));
        sel.extend_selection(c(2, 1));
        sel.collapse_to_focus();
        assert_eq!(sel.range(), Some(SelectionRange::single(c(2, 1))));
    }

    #[test]
    fn test_bounds_cells_row_major() {
        let b = SelectionRange {
            anchor: c(2, 1),
            focus: c(1, 0),
        }
        .bounds();
        let cells: Vec<_> = b.cells().collect();
        assert_eq!(cells, vec![c(1, 0), c(1, 1), c(2, 0), c(2, 1)]);
        assert_eq!(b.row_count(), 2);
        assert_eq!(b.col_count(), 2);
    }
}
