//! The results grid engine: selection, inline editing, pending modifications
//! and copy, independent of how the grid is drawn.

mod copy;
mod dispatch;
mod edit;
mod error;
mod ledger;
mod result;
mod selection;
mod value;

pub use copy::{serialize_selection, CopiedMarkers, COPY_FLASH_DURATION};
pub use dispatch::{
    CellHighlight, FocusProxy, FocusRequest, GridHost, GridKeyResult, InteractionMode,
    PointerButton, PointerEvent, ResultsGrid, DEFAULT_DOUBLE_CLICK_WINDOW,
};
pub use edit::{ActiveEdit, CaretMove, CommitOutcome, EditSession};
pub use error::GridError;
pub use ledger::{ModificationLedger, ModificationRecord};
pub use result::{GridView, ResultDisplay, ResultSet};
pub use selection::{CellCoord, Selection, SelectionBounds, SelectionRange};
pub use value::{format_cell, CellValue};
