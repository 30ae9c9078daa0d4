//! Reading a query outcome from a JSON document on disk.
//!
//! Two shapes are accepted:
//!
//! ```json
//! { "query": "SELECT ...", "columns": ["id"], "rows": [[1]], "executionTimeMs": 3 }
//! { "query": "SELECT ...", "error": "relation \"x\" does not exist" }
//! ```
//!
//! `rowsAffected` marks a mutation acknowledgment.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::grid::{ResultSet, ResultsGrid};

/// What a document describes: a result or an execution failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Result(ResultSet),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedResult {
    /// The query text that produced the outcome, if recorded.
    pub query: Option<String>,
    pub outcome: Outcome,
}

impl LoadedResult {
    /// Hands the outcome to the grid.
    pub fn apply(self, grid: &mut ResultsGrid) -> Option<String> {
        match self.outcome {
            Outcome::Result(rs) => grid.set_result(rs),
            Outcome::Error(msg) => grid.set_error(msg),
        }
        self.query
    }
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    result: ResultSet,
}

pub fn parse_result(json: &str) -> Result<LoadedResult> {
    let doc: Document = serde_json::from_str(json).context("Invalid result document")?;

    if let Some(error) = doc.error {
        return Ok(LoadedResult {
            query: doc.query,
            outcome: Outcome::Error(error),
        });
    }

    let cols = doc.result.col_count();
    for (i, row) in doc.result.rows.iter().enumerate() {
        if row.len() != cols {
            bail!("Row {} has {} values but there are {} columns", i, row.len(), cols);
        }
    }

    Ok(LoadedResult {
        query: doc.query,
        outcome: Outcome::Result(doc.result),
    })
}

pub fn load_result_file(path: &Path) -> Result<LoadedResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result file: {}", path.display()))?;
    let loaded =
        parse_result(&content).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded result file");
    Ok(loaded)
}
