//! End-to-end behaviour of the results grid driven through its public input API.

mod common;

use std::time::Instant;

use common::{click, double_click, four_by_three, loaded, people, RecordingHost};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use qgrid::grid::{
    format_cell, CellCoord, CellValue, CommitOutcome, GridKeyResult, GridView, ModificationRecord,
    ResultSet,
};
use qgrid::source::parse_result;

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(grid: &mut qgrid::grid::ResultsGrid, host: &mut RecordingHost, text: &str) {
    for ch in text.chars() {
        grid.handle_key(press(KeyCode::Char(ch)), host);
    }
}

fn copy_chord() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
}

#[test]
fn double_click_type_enter_records_one_modification() {
    let mut grid = loaded(people());
    let mut host = RecordingHost::default();

    double_click(&mut grid, &mut host, CellCoord::new(0, 1));
    assert!(grid.take_deferred_focus().is_some());
    assert_eq!(grid.edit_session().buffer(), Some("a"));

    // The seeded text starts selected, so typing replaces it.
    type_text(&mut grid, &mut host, "az");
    assert_eq!(
        grid.handle_key(press(KeyCode::Enter), &mut host),
        GridKeyResult::Committed(CommitOutcome::Modified)
    );

    assert_eq!(grid.ledger().len(), 1);
    assert_eq!(
        grid.ledger().get(CellCoord::new(0, 1)),
        Some(&ModificationRecord {
            original: CellValue::text("a"),
            new_text: "az".to_string(),
        })
    );
    assert_eq!(grid.display_text(CellCoord::new(0, 1)).as_deref(), Some("az"));
    assert_eq!(grid.display_text(CellCoord::new(1, 1)).as_deref(), Some("b"));
}

#[test]
fn click_shift_click_then_copy() {
    let mut grid = loaded(people());
    let mut host = RecordingHost::default();
    let t = Instant::now();

    click(&mut grid, &mut host, CellCoord::new(0, 0), false, t);
    click(&mut grid, &mut host, CellCoord::new(1, 1), true, t);
    assert_eq!(
        grid.handle_key(copy_chord(), &mut host),
        GridKeyResult::Copied { rows: 2, cols: 2 }
    );
    assert_eq!(host.clipboard.as_deref(), Some("1\ta\n2\tb"));
}

#[test]
fn copy_uses_pending_edit_text() {
    let mut grid = loaded(people());
    let mut host = RecordingHost::default();

    grid.start_editing(CellCoord::new(0, 1)).unwrap();
    grid.set_edit_buffer("az").unwrap();
    grid.commit_edit().unwrap();

    grid.select_all().unwrap();
    grid.handle_key(copy_chord(), &mut host);
    assert_eq!(host.clipboard.as_deref(), Some("1\taz\n2\tb"));
}

#[test]
fn acknowledgment_result_has_no_cells() {
    let loaded_result = parse_result(r#"{"rowsAffected": 3, "executionTimeMs": 12}"#).unwrap();
    let mut grid = qgrid::grid::ResultsGrid::default();
    loaded_result.apply(&mut grid);
    let mut host = RecordingHost::default();

    let message = grid.view().message().unwrap();
    assert!(message.starts_with("Query executed successfully. 3 row(s) affected."));
    assert!(!grid.view().is_interactive());
    assert!(grid.result().is_none());

    click(&mut grid, &mut host, CellCoord::new(0, 0), false, Instant::now());
    assert_eq!(grid.handle_key(copy_chord(), &mut host), GridKeyResult::Ignored);
    assert!(grid.select_all().is_err());
    assert!(grid.selection().is_empty());
    assert!(host.clipboard.is_none());
}

#[test]
fn ledger_round_trip_is_net_zero() {
    let rs = four_by_three();
    let mut grid = loaded(rs.clone());

    for row in 0..rs.row_count() {
        for col in 0..rs.col_count() {
            let at = CellCoord::new(row, col);
            let original = format_cell(rs.value(at).unwrap());

            grid.start_editing(at).unwrap();
            grid.set_edit_buffer("changed").unwrap();
            assert_eq!(grid.commit_edit(), Ok(CommitOutcome::Modified));

            grid.start_editing(at).unwrap();
            grid.set_edit_buffer(original).unwrap();
            assert_eq!(grid.commit_edit(), Ok(CommitOutcome::Reverted));
            assert!(!grid.ledger().contains(at));
        }
    }
    assert!(grid.ledger().is_empty());
}

#[test]
fn edit_buffer_seeds_from_ledger_or_formatter() {
    let rs = ResultSet::new(
        vec!["n".into(), "flag".into(), "doc".into()],
        vec![vec![
            CellValue::Null,
            CellValue::Bool(true),
            CellValue::from(serde_json::json!({"k": [1, 2]})),
        ]],
    );
    let mut grid = loaded(rs);
    let mut host = RecordingHost::default();

    for (col, expected) in [(0, "NULL"), (1, "true"), (2, r#"{"k":[1,2]}"#)] {
        grid.start_editing(CellCoord::new(0, col)).unwrap();
        assert_eq!(grid.edit_session().buffer(), Some(expected));
        grid.handle_key(press(KeyCode::Esc), &mut host);
    }

    grid.start_editing(CellCoord::new(0, 1)).unwrap();
    grid.set_edit_buffer("false").unwrap();
    grid.commit_edit().unwrap();
    grid.start_editing(CellCoord::new(0, 1)).unwrap();
    assert_eq!(grid.edit_session().buffer(), Some("false"));
}

#[test]
fn shift_arrow_grows_one_side_only() {
    let mut grid = loaded(four_by_three());
    let mut host = RecordingHost::default();
    grid.select_cell(CellCoord::new(3, 2)).unwrap();

    let mut last = grid.selection().bounds().unwrap();
    for _ in 0..4 {
        grid.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT), &mut host);
        let b = grid.selection().bounds().unwrap();
        assert_eq!(b.max_row, 3);
        assert!(b.min_row <= last.min_row);
        assert_eq!((b.min_col, b.max_col), (2, 2));
        last = b;
    }
    assert_eq!(last.min_row, 0);
}

#[test]
fn new_result_clears_ledger_selection_and_edit() {
    let mut grid = loaded(people());
    let mut host = RecordingHost::default();

    double_click(&mut grid, &mut host, CellCoord::new(1, 1));
    type_text(&mut grid, &mut host, "x");
    grid.handle_key(press(KeyCode::Enter), &mut host);
    grid.select_all().unwrap();
    grid.start_editing(CellCoord::new(0, 0)).unwrap();

    grid.set_result(four_by_three());
    assert!(grid.ledger().is_empty());
    assert!(grid.selection().is_empty());
    assert!(!grid.edit_session().is_editing());
    assert_eq!(grid.display_text(CellCoord::new(1, 1)).as_deref(), Some("r1c1"));
}

#[test]
fn tab_never_wraps_rows() {
    let mut grid = loaded(four_by_three());
    let mut host = RecordingHost::default();

    grid.start_editing(CellCoord::new(1, 2)).unwrap();
    grid.handle_key(press(KeyCode::Tab), &mut host);
    assert!(!grid.edit_session().is_editing());

    grid.start_editing(CellCoord::new(1, 0)).unwrap();
    grid.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT), &mut host);
    assert!(!grid.edit_session().is_editing());
}

#[test]
fn arrow_navigation_notifies_focus_proxy() {
    let mut grid = loaded(four_by_three());
    let mut host = RecordingHost::default();

    grid.handle_key(press(KeyCode::Right), &mut host);
    grid.handle_key(press(KeyCode::Right), &mut host);
    grid.handle_key(press(KeyCode::Down), &mut host);

    assert_eq!(
        host.focused,
        vec![
            CellCoord::new(0, 0),
            CellCoord::new(0, 1),
            CellCoord::new(1, 1)
        ]
    );
}

#[test]
fn filter_chord_reports_column_and_value() {
    let mut grid = loaded(people());
    let mut host = RecordingHost::default();
    click(&mut grid, &mut host, CellCoord::new(1, 0), false, Instant::now());

    grid.handle_key(
        KeyEvent::new(KeyCode::Char(';'), KeyModifiers::SUPER),
        &mut host,
    );
    assert_eq!(host.filters, vec![("id".to_string(), CellValue::int(2))]);

    let query = qgrid::sql::append_where_clause("SELECT * FROM people;", "id", &host.filters[0].1);
    assert_eq!(query, "SELECT * FROM people WHERE id = 2;");
}

#[test]
fn error_and_empty_results_are_not_interactive() {
    let mut grid = qgrid::grid::ResultsGrid::default();
    let mut host = RecordingHost::default();

    grid.set_executing();
    assert_eq!(grid.view(), &GridView::Executing);
    assert_eq!(grid.view().message().as_deref(), Some("Executing query..."));

    grid.set_error("permission denied");
    assert_eq!(grid.view().message().as_deref(), Some("permission denied"));
    assert_eq!(grid.handle_key(press(KeyCode::Down), &mut host), GridKeyResult::Ignored);

    grid.set_result(ResultSet::new(Vec::new(), Vec::new()).with_execution_time(4));
    assert_eq!(grid.view().message().as_deref(), Some("No results returned. (4ms)"));
    assert_eq!(grid.handle_key(press(KeyCode::Down), &mut host), GridKeyResult::Ignored);
    assert!(host.focused.is_empty());
}
