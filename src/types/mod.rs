//! Type catalog, type-code helpers and the result value model.

pub mod catalog;
pub mod sql_type;
mod column;
mod row;
mod value;

pub use catalog::TypeInfo;
pub use column::{Column, ColumnInfo};
pub use row::Row;
pub use value::Value;
