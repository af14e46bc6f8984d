//! Static catalog of data source types.
//!
//! Maps ClickHouse type names onto the client-side type description used for
//! column metadata, and maps bound SQL/C types back onto the ClickHouse type
//! used in typed query parameters.

use crate::constants::*;
use crate::error::{Error, Result};

/// Client-side description of a data source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// Display name reported to clients.
    pub sql_type_name: &'static str,
    /// Whether the type is unsigned.
    pub is_unsigned: bool,
    /// Concise SQL type code.
    pub sql_type: i16,
    /// Column size (digits for numbers, characters for strings).
    pub column_size: u64,
    /// Storage size in bytes.
    pub octet_length: u64,
    /// Whether `CONVERT(x, SQL_<type>)` may target this type.
    pub convertible: bool,
}

impl TypeInfo {
    /// Check if this is an integer type.
    pub fn is_integer_type(&self) -> bool {
        matches!(
            self.sql_type,
            SQL_TINYINT | SQL_SMALLINT | SQL_INTEGER | SQL_BIGINT
        )
    }

    /// Check if this is a string type.
    pub fn is_string_type(&self) -> bool {
        self.sql_type == SQL_VARCHAR
    }
}

const fn info(
    sql_type_name: &'static str,
    is_unsigned: bool,
    sql_type: i16,
    column_size: u64,
    octet_length: u64,
    convertible: bool,
) -> TypeInfo {
    TypeInfo {
        sql_type_name,
        is_unsigned,
        sql_type,
        column_size,
        octet_length,
        convertible,
    }
}

const MAX_STRING_SIZE: u64 = 0xFF_FFFF;
const MAX_STRING_OCTETS: u64 = 1 << 20;

static TYPES: &[(&str, TypeInfo)] = &[
    ("UInt8", info("TINYINT", true, SQL_TINYINT, 3, 1, false)),
    ("UInt16", info("SMALLINT", true, SQL_SMALLINT, 5, 2, false)),
    ("UInt32", info("INT", true, SQL_INTEGER, 10, 4, false)),
    ("UInt64", info("BIGINT", true, SQL_BIGINT, 19, 8, false)),
    ("Int8", info("TINYINT", false, SQL_TINYINT, 3, 1, true)),
    ("Int16", info("SMALLINT", false, SQL_SMALLINT, 5, 2, true)),
    ("Int32", info("INT", false, SQL_INTEGER, 10, 4, true)),
    ("Int64", info("BIGINT", false, SQL_BIGINT, 20, 8, true)),
    ("Float32", info("REAL", false, SQL_REAL, 7, 4, true)),
    ("Float64", info("DOUBLE", false, SQL_DOUBLE, 15, 8, true)),
    ("String", info("TEXT", true, SQL_VARCHAR, MAX_STRING_SIZE, MAX_STRING_OCTETS, true)),
    ("FixedString", info("TEXT", true, SQL_VARCHAR, MAX_STRING_SIZE, MAX_STRING_OCTETS, false)),
    ("Date", info("DATE", true, SQL_TYPE_DATE, 10, 6, true)),
    ("DateTime", info("TIMESTAMP", true, SQL_TYPE_TIMESTAMP, 19, 16, true)),
    ("Array", info("TEXT", true, SQL_VARCHAR, MAX_STRING_SIZE, MAX_STRING_OCTETS, false)),
];

/// Default precision of a decimal parameter bound without a column size.
const DEFAULT_DECIMAL_PRECISION: u64 = 38;

/// Find a catalog entry by exact source type name.
pub fn find(type_name: &str) -> Option<&'static TypeInfo> {
    TYPES
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, info)| info)
}

/// Resolve a source type, preferring the exact (parametrized) name.
pub fn lookup(type_name: &str, type_name_without_parameters: &str) -> Result<&'static TypeInfo> {
    find(type_name)
        .or_else(|| find(type_name_without_parameters))
        .ok_or_else(|| Error::UnknownType {
            type_name: type_name.to_string(),
            type_name_without_parameters: type_name_without_parameters.to_string(),
        })
}

/// Strip `Nullable(...)` and `LowCardinality(...)` wrappers.
///
/// Returns the inner type name and whether it was nullable.
pub fn unwrap_type_name(type_name: &str) -> (&str, bool) {
    let mut name = type_name.trim();
    let mut nullable = false;
    loop {
        if let Some(inner) = strip_wrapper(name, "Nullable") {
            nullable = true;
            name = inner;
        } else if let Some(inner) = strip_wrapper(name, "LowCardinality") {
            name = inner;
        } else {
            return (name, nullable);
        }
    }
}

fn strip_wrapper<'a>(name: &'a str, wrapper: &str) -> Option<&'a str> {
    name.strip_prefix(wrapper)?
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

/// Remove the parametrization suffix: `FixedString(10)` becomes `FixedString`.
pub fn strip_parameters(type_name: &str) -> &str {
    match type_name.find('(') {
        Some(pos) => type_name[..pos].trim_end(),
        None => type_name,
    }
}

/// Name of the ODBC constant for a SQL type code.
pub fn odbc_type_name(sql_type: i16) -> Option<&'static str> {
    let name = match sql_type {
        SQL_TINYINT => "SQL_TINYINT",
        SQL_SMALLINT => "SQL_SMALLINT",
        SQL_INTEGER => "SQL_INTEGER",
        SQL_BIGINT => "SQL_BIGINT",
        SQL_REAL => "SQL_REAL",
        SQL_DOUBLE => "SQL_DOUBLE",
        SQL_VARCHAR => "SQL_VARCHAR",
        SQL_TYPE_DATE => "SQL_TYPE_DATE",
        SQL_TYPE_TIMESTAMP => "SQL_TYPE_TIMESTAMP",
        _ => return None,
    };
    Some(name)
}

/// Map an `SQL_<TYPE>` name from a `CONVERT` call onto a convertible source type.
///
/// Both the ODBC constant name (`SQL_INTEGER`) and the display name form
/// (`SQL_INT`) are accepted, case-insensitively.
pub fn convertible_type(odbc_name: &str) -> Option<&'static str> {
    let wanted = odbc_name.trim().to_ascii_uppercase();
    TYPES
        .iter()
        .filter(|(_, info)| info.convertible)
        .find(|(_, info)| {
            odbc_type_name(info.sql_type) == Some(wanted.as_str())
                || wanted.strip_prefix("SQL_") == Some(info.sql_type_name)
        })
        .map(|(name, _)| *name)
}

/// ClickHouse type used for a typed query parameter.
///
/// The declared SQL type wins; parameters bound without one fall back to the
/// C type of the application buffer.
pub fn data_source_type(sql_type: i16, c_type: i16, length: u64, scale: i16) -> Result<String> {
    let name = match sql_type {
        SQL_CHAR | SQL_WCHAR if length > 0 => return Ok(format!("FixedString({})", length)),
        SQL_CHAR | SQL_WCHAR | SQL_VARCHAR | SQL_LONGVARCHAR | SQL_WVARCHAR
        | SQL_WLONGVARCHAR | SQL_BINARY | SQL_VARBINARY | SQL_LONGVARBINARY => "String",
        SQL_BIT => "UInt8",
        SQL_TINYINT => "Int8",
        SQL_SMALLINT => "Int16",
        SQL_INTEGER => "Int32",
        SQL_BIGINT => "Int64",
        SQL_REAL => "Float32",
        SQL_FLOAT | SQL_DOUBLE => "Float64",
        SQL_DECIMAL | SQL_NUMERIC => {
            let precision = if length > 0 {
                length
            } else {
                DEFAULT_DECIMAL_PRECISION
            };
            return Ok(format!("Decimal({}, {})", precision, scale.max(0)));
        }
        SQL_TYPE_DATE => "Date",
        SQL_TYPE_TIMESTAMP => "DateTime",
        SQL_GUID => "UUID",
        _ => {
            return data_source_type_for_c_type(c_type)
                .map(String::from)
                .ok_or(Error::UnsupportedSqlType { sql_type })
        }
    };
    Ok(name.to_string())
}

fn data_source_type_for_c_type(c_type: i16) -> Option<&'static str> {
    let name = match c_type {
        SQL_C_CHAR | SQL_C_WCHAR | SQL_C_BINARY => "String",
        SQL_C_SHORT | SQL_C_SSHORT => "Int16",
        SQL_C_USHORT => "UInt16",
        SQL_C_LONG | SQL_C_SLONG => "Int32",
        SQL_C_ULONG => "UInt32",
        SQL_C_TINYINT | SQL_C_STINYINT => "Int8",
        SQL_C_UTINYINT | SQL_C_BIT => "UInt8",
        SQL_C_SBIGINT => "Int64",
        SQL_C_UBIGINT => "UInt64",
        SQL_C_FLOAT => "Float32",
        SQL_C_DOUBLE => "Float64",
        SQL_C_TYPE_DATE => "Date",
        SQL_C_TYPE_TIMESTAMP => "DateTime",
        _ => return None,
    };
    Some(name)
}
