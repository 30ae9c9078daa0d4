mod grid;
mod status_line;

pub use grid::{compute_column_widths, DataGrid, GridLayout, GridViewport, VisibleColumn};
pub use status_line::{grid_status_line, Priority, StatusLineBuilder, StatusSegment};
