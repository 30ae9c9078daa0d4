//! Building the `column = value` filter that the grid adds to the query text.

use crate::grid::CellValue;

/// Render a cell value as a SQL literal.
///
/// Numbers stay bare, booleans become `TRUE`/`FALSE`, everything else is a
/// single-quoted string with embedded quotes doubled.
pub fn format_value_for_sql(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NULL".to_string(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Text(s) => quote_literal(s),
        CellValue::Structured(v) => quote_literal(&v.to_string()),
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// The condition for one column: `col IS NULL` or `col = literal`.
pub fn filter_condition(column: &str, value: &CellValue) -> String {
    if value.is_null() {
        format!("{} IS NULL", column)
    } else {
        format!("{} = {}", column, format_value_for_sql(value))
    }
}

/// Append a filter on `column` to `query`.
///
/// A trailing semicolon is dropped first and put back at the end. If the
/// query already has a `WHERE` keyword the condition is joined with `AND`,
/// otherwise a `WHERE` is added.
pub fn append_where_clause(query: &str, column: &str, value: &CellValue) -> String {
    let base = query.trim();
    let base = base.strip_suffix(';').unwrap_or(base).trim_end();
    let condition = filter_condition(column, value);

    if base.is_empty() {
        return format!("WHERE {};", condition);
    }
    if contains_keyword(base, "WHERE") {
        format!("{} AND {};", base, condition)
    } else {
        format!("{} WHERE {};", base, condition)
    }
}

/// Case-insensitive whole-word search.
fn contains_keyword(text: &str, keyword: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';

    upper.match_indices(keyword).any(|(start, _)| {
        let end = start + keyword.len();
        let before_ok = upper[..start].chars().next_back().is_none_or(|c| !is_word(c));
        let after_ok = upper[end..].chars().next().is_none_or(|c| !is_word(c));
        before_ok && after_ok
    })
}
