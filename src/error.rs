//! Error types for the ClickHouse ODBC driver core.

use std::io;
use thiserror::Error;

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for driver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during network communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A descriptor attribute assignment contradicts the record's type triple.
    #[error("Inconsistent descriptor information: {message}")]
    InconsistentDescriptor { message: String },

    /// Bound parameter count disagrees with the placeholders in the query.
    #[error("COUNT field incorrect")]
    CountFieldIncorrect,

    /// Parameter direction other than input, or a streamed parameter.
    #[error("Unable to extract data from bound param buffer: param IO type {io_type} is not supported")]
    UnsupportedParamDirection { io_type: i16 },

    /// Data-at-execution bindings are not supported.
    #[error("Unable to extract data from bound buffer: data-at-execution bindings not supported")]
    DataAtExecution,

    /// The bound C type has no decoder.
    #[error("Unable to extract data from bound buffer: source type representation {c_type} not supported")]
    UnsupportedCType { c_type: i16 },

    /// The SQL type has no data source counterpart.
    #[error("SQL type {sql_type} is not supported")]
    UnsupportedSqlType { sql_type: i16 },

    /// Unknown source type name in the type catalog.
    #[error("Unsupported type: {type_name} ({type_name_without_parameters})")]
    UnknownType {
        type_name: String,
        type_name_without_parameters: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP status code: {status}\nReceived error:\n{body}")]
    HttpStatus { status: u16, body: String },

    /// An attribute holds a value of a different representation than requested.
    #[error("Attribute {attribute} does not hold a value of type {expected}")]
    AttributeType {
        attribute: String,
        expected: &'static str,
    },

    /// Attribute id unknown to the handle it was applied to.
    #[error("Unknown attribute id: {id}")]
    UnknownAttribute { id: i32 },

    /// Handle does not exist or is of the wrong kind.
    #[error("Invalid handle: {handle}")]
    InvalidHandle { handle: u64 },

    /// Attempt to free a descriptor allocated implicitly by a statement.
    #[error("Invalid use of an automatically allocated descriptor handle")]
    ImplicitDescriptorFree,

    /// Operation requires an open connection.
    #[error("Connection not open")]
    ConnectionNotOpen,

    /// Invalid connect string.
    #[error("Invalid connect string: {message}")]
    InvalidConnectString { message: String },

    /// Descriptor record index is not addressable.
    #[error("Invalid descriptor index: {index}")]
    InvalidDescriptorIndex { index: usize },

    /// Column index out of bounds.
    #[error("Column index {index} out of bounds (columns: {count})")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    /// Operation needs an active result set.
    #[error("Function sequence error: no result set")]
    NoResultSet,

    /// Malformed result stream.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Type conversion error.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },
}

impl Error {
    /// Create an inconsistent descriptor error.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentDescriptor {
            message: message.into(),
        }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// SQLSTATE reported for this error.
    pub fn sql_state(&self) -> &'static str {
        match self {
            Error::Io(_) => "08S01",
            Error::InconsistentDescriptor { .. } => "HY021",
            Error::CountFieldIncorrect => "07002",
            Error::UnsupportedParamDirection { .. }
            | Error::DataAtExecution
            | Error::UnsupportedSqlType { .. } => "HYC00",
            Error::UnsupportedCType { .. } => "HY003",
            Error::UnknownType { .. } => "HY004",
            Error::AttributeType { .. } => "HY024",
            Error::UnknownAttribute { .. } => "HY092",
            Error::InvalidHandle { .. } => "HY000",
            Error::ImplicitDescriptorFree => "HY017",
            Error::ConnectionNotOpen => "08003",
            Error::InvalidDescriptorIndex { .. } | Error::ColumnIndexOutOfBounds { .. } => "07009",
            Error::NoResultSet => "HY010",
            Error::InvalidConnectString { .. } => "HY000",
            Error::HttpStatus { .. } | Error::Protocol { .. } => "HY000",
            Error::TypeConversion { .. } => "22018",
        }
    }
}
