use thiserror::Error;

/// Errors raised at the grid engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} result")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("the grid has no interactive result loaded")]
    NotInteractive,
    #[error("a cell is already being edited")]
    AlreadyEditing,
    #[error("no cell is being edited")]
    NotEditing,
}
