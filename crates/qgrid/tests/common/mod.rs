//! Shared fixtures for qgrid integration tests.

use std::time::{Duration, Instant};

use anyhow::Result;
use qgrid::grid::{
    CellCoord, CellValue, FocusProxy, GridHost, PointerButton, PointerEvent, ResultSet,
    ResultsGrid,
};

/// Records every effect the grid asks for instead of touching a terminal.
#[derive(Default)]
pub struct RecordingHost {
    pub focused: Vec<CellCoord>,
    pub clipboard: Option<String>,
    pub filters: Vec<(String, CellValue)>,
}

impl FocusProxy for RecordingHost {
    fn focus_element(&mut self, coord: CellCoord) {
        self.focused.push(coord);
    }
}

impl GridHost for RecordingHost {
    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn add_where_clause(&mut self, column: &str, value: &CellValue) {
        self.filters.push((column.to_string(), value.clone()));
    }
}

/// `{columns: ["id", "name"], rows: [[1, "a"], [2, "b"]]}`
pub fn people() -> ResultSet {
    ResultSet::new(
        vec!["id".into(), "name".into()],
        vec![
            vec![CellValue::int(1), CellValue::text("a")],
            vec![CellValue::int(2), CellValue::text("b")],
        ],
    )
}

/// 4 rows by 3 columns of `"r{row}c{col}"` text.
pub fn four_by_three() -> ResultSet {
    let rows = (0..4)
        .map(|r| (0..3).map(|c| CellValue::text(format!("r{r}c{c}"))).collect())
        .collect();
    ResultSet::new(vec!["a".into(), "b".into(), "c".into()], rows)
}

pub fn loaded(result: ResultSet) -> ResultsGrid {
    let mut grid = ResultsGrid::default();
    grid.set_result(result);
    grid
}

/// Primary press then release on `coord`.
pub fn click(
    grid: &mut ResultsGrid,
    host: &mut RecordingHost,
    coord: CellCoord,
    shift: bool,
    at: Instant,
) {
    grid.handle_pointer(
        PointerEvent::Press {
            coord,
            button: PointerButton::Primary,
            shift,
            at,
        },
        host,
    );
    grid.handle_pointer(PointerEvent::Release, host);
}

pub fn double_click(grid: &mut ResultsGrid, host: &mut RecordingHost, coord: CellCoord) {
    let t = Instant::now();
    click(grid, host, coord, false, t);
    click(grid, host, coord, false, t + Duration::from_millis(80));
}
