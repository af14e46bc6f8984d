//! Typed cell values of a result set row.

use crate::constants::*;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use super::catalog::TypeInfo;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Character data (String, FixedString, Array text, ...).
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convert the textual cell representation into a typed value.
    pub fn from_text(text: &str, type_info: &TypeInfo) -> Result<Self> {
        let conversion_error = |e: &dyn fmt::Display| {
            Error::type_conversion(format!(
                "cannot convert '{}' to {}: {}",
                text, type_info.sql_type_name, e
            ))
        };
        match type_info.sql_type {
            SQL_TINYINT | SQL_SMALLINT | SQL_INTEGER | SQL_BIGINT => {
                if type_info.is_unsigned {
                    text.parse().map(Value::UInt).map_err(|e| conversion_error(&e))
                } else {
                    text.parse().map(Value::Int).map_err(|e| conversion_error(&e))
                }
            }
            SQL_REAL | SQL_DOUBLE => match text {
                "nan" | "-nan" => Ok(Value::Float(f64::NAN)),
                "inf" | "+inf" => Ok(Value::Float(f64::INFINITY)),
                "-inf" => Ok(Value::Float(f64::NEG_INFINITY)),
                _ => text.parse().map(Value::Float).map_err(|e| conversion_error(&e)),
            },
            SQL_TYPE_DATE => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| conversion_error(&e)),
            SQL_TYPE_TIMESTAMP => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .map(Value::DateTime)
                .map_err(|e| conversion_error(&e)),
            _ => Ok(Value::String(text.to_string())),
        }
    }

    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get the value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}
