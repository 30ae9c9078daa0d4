//! Result sets and the states the grid surface can be in.

use serde::{Deserialize, Serialize};

use super::selection::CellCoord;
use super::value::CellValue;

/// One query execution's output. Replaced as a whole on every execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub execution_time_ms: u64,
    /// Present for statements that modify data; such results have no table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
}

/// How a loaded result is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisplay {
    Acknowledgment { rows_affected: u64 },
    NoColumns,
    Table,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            execution_time_ms: 0,
            rows_affected: None,
        }
    }

    pub fn acknowledgment(rows_affected: u64, execution_time_ms: u64) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            execution_time_ms,
            rows_affected: Some(rows_affected),
        }
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn value(&self, coord: CellCoord) -> Option<&CellValue> {
        self.rows.get(coord.row).and_then(|row| row.get(coord.col))
    }

    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.columns.get(col).map(String::as_str)
    }

    pub fn display(&self) -> ResultDisplay {
        if let Some(rows_affected) = self.rows_affected {
            ResultDisplay::Acknowledgment { rows_affected }
        } else if self.columns.is_empty() {
            ResultDisplay::NoColumns
        } else {
            ResultDisplay::Table
        }
    }

    pub fn is_in_bounds(&self, coord: CellCoord) -> bool {
        coord.row < self.row_count() && coord.col < self.col_count()
    }
}

/// Everything the results surface can show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GridView {
    #[default]
    NoResult,
    Executing,
    Failed(String),
    Loaded(ResultSet),
}

impl GridView {
    /// The result, when one is loaded and shown as a table with cells.
    pub fn table(&self) -> Option<&ResultSet> {
        match self {
            GridView::Loaded(rs) if rs.display() == ResultDisplay::Table => Some(rs),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.table()
            .is_some_and(|rs| rs.row_count() > 0 && rs.col_count() > 0)
    }

    /// Text shown in place of the table, if the surface is not a table.
    pub fn message(&self) -> Option<String> {
        match self {
            GridView::NoResult => Some("Run a query to see results".to_string()),
            GridView::Executing => Some("Executing query...".to_string()),
            GridView::Failed(err) => Some(err.clone()),
            GridView::Loaded(rs) => match rs.display() {
                ResultDisplay::Acknowledgment { rows_affected } => Some(format!(
                    "Query executed successfully. {} row(s) affected. ({}ms)",
                    rows_affected, rs.execution_time_ms
                )),
                ResultDisplay::NoColumns => {
                    Some(format!("No results returned. ({}ms)", rs.execution_time_ms))
                }
                ResultDisplay::Table => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["id".into(), "name".into()],
            vec![
                vec![CellValue::int(1), CellValue::text("a")],
                vec![CellValue::int(2), CellValue::text("b")],
            ],
        )
    }

    #[test]
    fn test_dimensions_and_lookup() {
        let rs = sample();
        assert_eq!(rs.row_count(), 2);
        assert_eq!(rs.col_count(), 2);
        assert_eq!(rs.value(CellCoord::new(1, 1)), Some(&CellValue::text("b")));
        assert_eq!(rs.value(CellCoord::new(2, 0)), None);
        assert_eq!(rs.column_name(0), Some("id"));
        assert!(rs.is_in_bounds(CellCoord::new(1, 1)));
        assert!(!rs.is_in_bounds(CellCoord::new(1, 2)));
    }

    #[test]
    fn test_acknowledgment_has_no_table() {
        let view = GridView::Loaded(ResultSet::acknowledgment(3, 12));
        assert!(view.table().is_none());
        assert!(!view.is_interactive());
        let msg = view.message().unwrap();
        assert!(msg.contains("3 row(s) affected"));
        assert!(msg.contains("12ms"));
    }

    #[test]
    fn test_rows_affected_wins_over_rows() {
        let mut rs = sample();
        rs.rows_affected = Some(2);
        assert_eq!(rs.display(), ResultDisplay::Acknowledgment { rows_affected: 2 });
    }

    #[test]
    fn test_no_columns_is_informational() {
        let view = GridView::Loaded(ResultSet::default().with_execution_time(4));
        assert!(!view.is_interactive());
        assert_eq!(view.message().unwrap(), "No results returned. (4ms)");
    }

    #[test]
    fn test_columns_without_rows_is_table_but_not_interactive() {
        let view = GridView::Loaded(ResultSet::new(vec!["a".into()], vec![]));
        assert!(view.table().is_some());
        assert!(!view.is_interactive());
        assert!(view.message().is_none());
    }

    #[test]
    fn test_non_result_states() {
        assert!(!GridView::NoResult.is_interactive());
        assert!(!GridView::Executing.is_interactive());
        let failed = GridView::Failed("boom".into());
        assert!(!failed.is_interactive());
        assert_eq!(failed.message().unwrap(), "boom");
        assert!(GridView::Loaded(sample()).is_interactive());
    }

    #[test]
    fn test_parse_camel_case() {
        let rs: ResultSet = serde_json::from_str(
            r#"{"columns":["id"],"rows":[[1]],"executionTimeMs":12}"#,
        )
        .unwrap();
        assert_eq!(rs.execution_time_ms, 12);
        assert_eq!(rs.rows_affected, None);

        let ack: ResultSet =
            serde_json::from_str(r#"{"columns":[],"rows":[],"executionTimeMs":12,"rowsAffected":3}"#)
                .unwrap();
        assert_eq!(ack.rows_affected, Some(3));

        let bare: ResultSet =
            serde_json::from_str(r#"{"rowsAffected":3,"executionTimeMs":12}"#).unwrap();
        assert_eq!(bare.display(), ResultDisplay::Acknowledgment { rows_affected: 3 });
    }
}
