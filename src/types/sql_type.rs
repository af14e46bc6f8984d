//! Predicates and conversions over SQL type codes.
//!
//! A verbose type (`SQL_DATETIME`, `SQL_INTERVAL`) needs a datetime/interval
//! subcode to name a concrete type; the pair maps onto exactly one concise
//! type code and back.

use crate::constants::*;
use crate::error::{Error, Result};

/// Check whether `sql_type` is a verbose type family.
pub fn is_verbose_type(sql_type: i16) -> bool {
    sql_type == SQL_DATETIME || sql_type == SQL_INTERVAL
}

/// Check whether `sql_type` is a concise datetime type.
pub fn is_concise_datetime_type(sql_type: i16) -> bool {
    (SQL_TYPE_DATE..=SQL_TYPE_TIMESTAMP).contains(&sql_type)
}

/// Check whether `sql_type` is a concise interval type.
pub fn is_concise_interval_type(sql_type: i16) -> bool {
    (SQL_INTERVAL_YEAR..=SQL_INTERVAL_MINUTE_TO_SECOND).contains(&sql_type)
}

/// Check whether `sql_type` is a concise datetime or interval type.
pub fn is_concise_datetime_interval_type(sql_type: i16) -> bool {
    is_concise_datetime_type(sql_type) || is_concise_interval_type(sql_type)
}

/// Check whether `code` is a datetime subcode.
pub fn is_datetime_code(code: i16) -> bool {
    (SQL_CODE_DATE..=SQL_CODE_TIMESTAMP).contains(&code)
}

/// Check whether `code` is an interval subcode.
pub fn is_interval_code(code: i16) -> bool {
    (SQL_CODE_YEAR..=SQL_CODE_MINUTE_TO_SECOND).contains(&code)
}

/// Check whether the interval subcode carries a seconds field.
pub fn interval_code_has_second_component(code: i16) -> bool {
    matches!(
        code,
        SQL_CODE_SECOND | SQL_CODE_DAY_TO_SECOND | SQL_CODE_HOUR_TO_SECOND | SQL_CODE_MINUTE_TO_SECOND
    )
}

/// Check whether `code` is a valid subcode for the verbose type.
pub fn is_code_of(code: i16, verbose_type: i16) -> bool {
    match verbose_type {
        SQL_DATETIME => is_datetime_code(code),
        SQL_INTERVAL => is_interval_code(code),
        _ => false,
    }
}

/// Combine a verbose type and a subcode into the concise type.
pub fn concise_type_from_code(code: i16, verbose_type: i16) -> Result<i16> {
    match verbose_type {
        SQL_DATETIME if is_datetime_code(code) => Ok(SQL_TYPE_DATE - SQL_CODE_DATE + code),
        SQL_INTERVAL if is_interval_code(code) => Ok(SQL_INTERVAL_YEAR - SQL_CODE_YEAR + code),
        _ => Err(Error::inconsistent(format!(
            "subcode {} is not valid for type {}",
            code, verbose_type
        ))),
    }
}

/// Get the verbose type of a concise type; non-datetime/interval types are their own verbose type.
pub fn verbose_type_of(sql_type: i16) -> i16 {
    if is_concise_datetime_type(sql_type) {
        SQL_DATETIME
    } else if is_concise_interval_type(sql_type) {
        SQL_INTERVAL
    } else {
        sql_type
    }
}

/// Get the subcode of a concise datetime/interval type, 0 otherwise.
pub fn code_of(sql_type: i16) -> i16 {
    if is_concise_datetime_type(sql_type) {
        sql_type - SQL_TYPE_DATE + SQL_CODE_DATE
    } else if is_concise_interval_type(sql_type) {
        sql_type - SQL_INTERVAL_YEAR + SQL_CODE_YEAR
    } else {
        0
    }
}

/// Character types, including the wide variants.
pub fn is_character_type(sql_type: i16) -> bool {
    matches!(
        sql_type,
        SQL_CHAR | SQL_VARCHAR | SQL_LONGVARCHAR | SQL_WCHAR | SQL_WVARCHAR | SQL_WLONGVARCHAR
    )
}

/// Binary types.
pub fn is_binary_type(sql_type: i16) -> bool {
    matches!(sql_type, SQL_BINARY | SQL_VARBINARY | SQL_LONGVARBINARY)
}

/// Exact and approximate numeric types.
pub fn is_numeric_type(sql_type: i16) -> bool {
    matches!(
        sql_type,
        SQL_DECIMAL
            | SQL_NUMERIC
            | SQL_TINYINT
            | SQL_SMALLINT
            | SQL_INTEGER
            | SQL_BIGINT
            | SQL_REAL
            | SQL_FLOAT
            | SQL_DOUBLE
            | SQL_BIT
    )
}

/// Check whether a parameter direction carries input data.
pub fn is_input_param(io_type: i16) -> bool {
    matches!(
        io_type,
        SQL_PARAM_INPUT | SQL_PARAM_INPUT_OUTPUT | SQL_PARAM_INPUT_OUTPUT_STREAM
    )
}

/// Check whether a parameter direction is streamed.
pub fn is_stream_param(io_type: i16) -> bool {
    matches!(io_type, SQL_PARAM_INPUT_OUTPUT_STREAM | SQL_PARAM_OUTPUT_STREAM)
}
