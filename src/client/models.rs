//! Query result model shared by both clients

use crate::error::{ScholarError, ScholarResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of executing a statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Tabular result rows
    pub records: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            records: Vec::new(),
        }
    }

    /// Single-row result
    pub fn single(columns: &[&str], values: Vec<Value>) -> Self {
        let mut result = Self::new(columns);
        result.records.push(values);
        result
    }

    pub fn push(&mut self, values: Vec<Value>) {
        self.records.push(values);
    }

    /// Number of result records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.records.iter().map(move |values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    /// `matched` count of a write statement; 0 when absent.
    pub fn matched(&self) -> u64 {
        self.scalar("matched")
    }

    /// Integer in the first row, 0 when absent
    pub fn scalar(&self, column: &str) -> u64 {
        self.rows()
            .next()
            .and_then(|row| row.get(column).and_then(Value::as_u64))
            .unwrap_or(0)
    }
}

/// Borrowed view of one record with typed column access
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> ResultRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    fn missing(column: &str, expected: &str) -> ScholarError {
        ScholarError::UnexpectedResult(format!("column '{}' is not {}", column, expected))
    }

    /// Non-null text. Integer keys are rendered as text.
    pub fn text(&self, column: &str) -> ScholarResult<String> {
        self.opt_text(column)
            .ok_or_else(|| Self::missing(column, "text"))
    }

    pub fn opt_text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn count(&self, column: &str) -> ScholarResult<u64> {
        self.get(column)
            .and_then(Value::as_u64)
            .ok_or_else(|| Self::missing(column, "a count"))
    }

    pub fn float(&self, column: &str) -> ScholarResult<f64> {
        self.get(column)
            .and_then(Value::as_f64)
            .ok_or_else(|| Self::missing(column, "a number"))
    }

    pub fn flag(&self, column: &str) -> ScholarResult<bool> {
        self.get(column)
            .and_then(Value::as_bool)
            .ok_or_else(|| Self::missing(column, "a boolean"))
    }
}
