//! Per-handle diagnostic area.

use crate::error::Error;

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Five-character SQLSTATE.
    pub sql_state: String,
    /// Human readable message.
    pub message: String,
}

impl From<&Error> for DiagnosticRecord {
    fn from(err: &Error) -> Self {
        Self {
            sql_state: err.sql_state().to_string(),
            message: err.to_string(),
        }
    }
}

/// Diagnostic header plus records of the last operation on a handle.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Row count of the last executed statement or completed result set.
    pub row_count: i64,
    records: Vec<DiagnosticRecord>,
}

impl Diagnostics {
    /// Create an empty diagnostic area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear records and the row count.
    pub fn reset(&mut self) {
        self.row_count = 0;
        self.records.clear();
    }

    /// Clear records, keeping the row count.
    pub fn clear_records(&mut self) {
        self.records.clear();
    }

    /// Reset the row count only.
    pub fn reset_row_count(&mut self) {
        self.row_count = 0;
    }

    /// Record an error.
    pub fn push_error(&mut self, err: &Error) {
        self.records.push(DiagnosticRecord::from(err));
    }

    /// Get records in insertion order.
    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    /// Get a record by its 1-based number.
    pub fn record(&self, number: usize) -> Option<&DiagnosticRecord> {
        number.checked_sub(1).and_then(|i| self.records.get(i))
    }
}
