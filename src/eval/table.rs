//! Tabular output: named tables of [`ResultValue`] cells.
//!
//! A table renders to rows of strings. Row 0 is `[name, column headings...]`;
//! each following row is `[row heading, cells...]`:
//!
//! ```text
//! ["Micro F1-measure", "ACE2004", "KORE50"]
//! ["Babelfy",         "0.612",   "error (-3)"]
//! ["TagMe",           "0.701",   "n.a."]
//! ```

use super::result::ResultValue;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A labelled matrix of result cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (top-left cell).
    pub name: String,
    /// Column headings.
    pub column_headings: Vec<String>,
    /// `(row heading, cells)`, one cell per column.
    pub rows: Vec<(String, Vec<ResultValue>)>,
}

impl Table {
    /// Create an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>, column_headings: Vec<String>) -> Self {
        Self {
            name: name.into(),
            column_headings,
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells are filled with `NotAvailable`.
    pub fn push_row(&mut self, heading: impl Into<String>, mut cells: Vec<ResultValue>) {
        cells.resize(self.column_headings.len(), ResultValue::NotAvailable);
        self.rows.push((heading.into(), cells));
    }

    /// Look up a cell by row and column heading.
    pub fn cell(&self, row: &str, column: &str) -> Option<ResultValue> {
        let col = self.column_headings.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|(heading, _)| heading == row)
            .and_then(|(_, cells)| cells.get(col).copied())
    }

    /// Render to string rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut out = Vec::with_capacity(self.rows.len() + 1);
        out.push(
            std::iter::once(self.name.clone())
                .chain(self.column_headings.iter().cloned())
                .collect(),
        );
        for (heading, cells) in &self.rows {
            out.push(
                std::iter::once(heading.clone())
                    .chain(cells.iter().map(ResultValue::format))
                    .collect(),
            );
        }
        out
    }

    /// Render to a JSON array of string arrays.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_rows())?)
    }

    /// Plain-text rendering with aligned columns.
    pub fn summary(&self) -> String {
        let rows = self.to_rows();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                rows.iter()
                    .filter_map(|r| r.get(c))
                    .map(|s| s.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for row in &rows {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
