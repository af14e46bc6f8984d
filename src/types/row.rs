//! A decoded result set row.

use std::sync::Arc;

use super::column::ColumnInfo;
use super::value::Value;

/// A row of query results.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values.
    values: Vec<Value>,
    /// Shared column information (reference counted).
    column_info: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with values and shared column info.
    pub fn new(values: Vec<Value>, column_info: Arc<ColumnInfo>) -> Self {
        Self {
            values,
            column_info,
        }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a mutable value by column index (0-based).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    /// Get value by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.column_info
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }
}
