//! Column and ColumnInfo types for result set metadata.

use crate::error::Result;

use super::catalog::{self, TypeInfo};

/// A column in a result set.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Full source type name, e.g. `Nullable(FixedString(8))`.
    pub type_name: String,
    /// Source type name without wrappers and parameters, e.g. `FixedString`.
    pub type_name_without_parameters: String,
    /// Catalog entry for the type.
    pub type_info: TypeInfo,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Declared size of a `FixedString(n)` column.
    pub fixed_size: Option<u64>,
}

impl Column {
    /// Create a column from its name and source type name.
    ///
    /// Returns error if the type is not in the catalog.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Result<Self> {
        let type_name = type_name.into();
        let (inner, nullable) = catalog::unwrap_type_name(&type_name);
        let base = catalog::strip_parameters(inner);
        let type_info = *catalog::lookup(inner, base)?;
        let fixed_size = if base == "FixedString" {
            inner[base.len()..]
                .trim_matches(|c| c == '(' || c == ')')
                .trim()
                .parse()
                .ok()
        } else {
            None
        };

        Ok(Self {
            name: name.into(),
            type_name_without_parameters: base.to_string(),
            type_name,
            type_info,
            nullable,
            fixed_size,
        })
    }

    /// Column size reported to clients.
    pub fn column_size(&self) -> u64 {
        self.fixed_size.unwrap_or(self.type_info.column_size)
    }
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<Column>,
}

impl ColumnInfo {
    /// Create new column info from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find column index by name, exact match first, then case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }
}
