//! Call-level interface constants.
//!
//! Values follow the ODBC 3.x headers (`sql.h`, `sqlext.h`).

// SQL data types
pub const SQL_UNKNOWN_TYPE: i16 = 0;
pub const SQL_CHAR: i16 = 1;
pub const SQL_NUMERIC: i16 = 2;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_FLOAT: i16 = 6;
pub const SQL_REAL: i16 = 7;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_DATETIME: i16 = 9;
pub const SQL_INTERVAL: i16 = 10;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_TYPE_TIME: i16 = 92;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_BINARY: i16 = -2;
pub const SQL_VARBINARY: i16 = -3;
pub const SQL_LONGVARBINARY: i16 = -4;
pub const SQL_BIGINT: i16 = -5;
pub const SQL_TINYINT: i16 = -6;
pub const SQL_BIT: i16 = -7;
pub const SQL_WCHAR: i16 = -8;
pub const SQL_WVARCHAR: i16 = -9;
pub const SQL_WLONGVARCHAR: i16 = -10;
pub const SQL_GUID: i16 = -11;

// Interval concise types
pub const SQL_INTERVAL_YEAR: i16 = 101;
pub const SQL_INTERVAL_MONTH: i16 = 102;
pub const SQL_INTERVAL_DAY: i16 = 103;
pub const SQL_INTERVAL_HOUR: i16 = 104;
pub const SQL_INTERVAL_MINUTE: i16 = 105;
pub const SQL_INTERVAL_SECOND: i16 = 106;
pub const SQL_INTERVAL_YEAR_TO_MONTH: i16 = 107;
pub const SQL_INTERVAL_DAY_TO_HOUR: i16 = 108;
pub const SQL_INTERVAL_DAY_TO_MINUTE: i16 = 109;
pub const SQL_INTERVAL_DAY_TO_SECOND: i16 = 110;
pub const SQL_INTERVAL_HOUR_TO_MINUTE: i16 = 111;
pub const SQL_INTERVAL_HOUR_TO_SECOND: i16 = 112;
pub const SQL_INTERVAL_MINUTE_TO_SECOND: i16 = 113;

// Datetime subcodes
pub const SQL_CODE_DATE: i16 = 1;
pub const SQL_CODE_TIME: i16 = 2;
pub const SQL_CODE_TIMESTAMP: i16 = 3;

// Interval subcodes
pub const SQL_CODE_YEAR: i16 = 1;
pub const SQL_CODE_MONTH: i16 = 2;
pub const SQL_CODE_DAY: i16 = 3;
pub const SQL_CODE_HOUR: i16 = 4;
pub const SQL_CODE_MINUTE: i16 = 5;
pub const SQL_CODE_SECOND: i16 = 6;
pub const SQL_CODE_YEAR_TO_MONTH: i16 = 7;
pub const SQL_CODE_DAY_TO_HOUR: i16 = 8;
pub const SQL_CODE_DAY_TO_MINUTE: i16 = 9;
pub const SQL_CODE_DAY_TO_SECOND: i16 = 10;
pub const SQL_CODE_HOUR_TO_MINUTE: i16 = 11;
pub const SQL_CODE_HOUR_TO_SECOND: i16 = 12;
pub const SQL_CODE_MINUTE_TO_SECOND: i16 = 13;

// C data types
pub const SQL_C_CHAR: i16 = SQL_CHAR;
pub const SQL_C_WCHAR: i16 = SQL_WCHAR;
pub const SQL_C_SHORT: i16 = SQL_SMALLINT;
pub const SQL_C_LONG: i16 = SQL_INTEGER;
pub const SQL_C_SSHORT: i16 = -15;
pub const SQL_C_USHORT: i16 = -17;
pub const SQL_C_SLONG: i16 = -16;
pub const SQL_C_ULONG: i16 = -18;
pub const SQL_C_FLOAT: i16 = SQL_REAL;
pub const SQL_C_DOUBLE: i16 = SQL_DOUBLE;
pub const SQL_C_BIT: i16 = SQL_BIT;
pub const SQL_C_TINYINT: i16 = SQL_TINYINT;
pub const SQL_C_STINYINT: i16 = -26;
pub const SQL_C_UTINYINT: i16 = -28;
pub const SQL_C_SBIGINT: i16 = -25;
pub const SQL_C_UBIGINT: i16 = -27;
pub const SQL_C_BINARY: i16 = SQL_BINARY;
pub const SQL_C_DATE: i16 = SQL_DATETIME;
pub const SQL_C_TIME: i16 = SQL_INTERVAL;
pub const SQL_C_TYPE_DATE: i16 = SQL_TYPE_DATE;
pub const SQL_C_TYPE_TIMESTAMP: i16 = SQL_TYPE_TIMESTAMP;
pub const SQL_C_DEFAULT: i16 = 99;

// Length / indicator sentinels
pub const SQL_NULL_DATA: i64 = -1;
pub const SQL_DATA_AT_EXEC: i64 = -2;
pub const SQL_NTS: i64 = -3;
pub const SQL_DEFAULT_PARAM: i64 = -5;

// Parameter directions
pub const SQL_PARAM_INPUT: i16 = 1;
pub const SQL_PARAM_INPUT_OUTPUT: i16 = 2;
pub const SQL_PARAM_OUTPUT: i16 = 4;
pub const SQL_PARAM_INPUT_OUTPUT_STREAM: i16 = 8;
pub const SQL_PARAM_OUTPUT_STREAM: i16 = 16;

// Descriptor header / record values
pub const SQL_DESC_ALLOC_AUTO: i16 = 1;
pub const SQL_DESC_ALLOC_USER: i16 = 2;
pub const SQL_BIND_BY_COLUMN: u64 = 0;
pub const SQL_NULLABLE: i16 = 1;
pub const SQL_NAMED: i16 = 0;
pub const SQL_UNNAMED: i16 = 1;

// Statement attribute values
pub const SQL_NOSCAN_OFF: u64 = 0;
pub const SQL_NOSCAN_ON: u64 = 1;

/// SQLLEN width in bytes, the element size of length/indicator arrays.
pub const SQL_LEN_SIZE: usize = std::mem::size_of::<i64>();
