//! qgrid: an interactive terminal grid for SQL query results.
//!
//! The [`grid`] module is the UI-independent engine: selection, inline edits
//! kept as pending modifications, and clipboard copy. Everything else wires it
//! to a terminal.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod grid;
pub mod logging;
pub mod source;
pub mod sql;
pub mod ui;
