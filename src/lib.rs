//! ClickHouse ODBC driver core for Rust
//!
//! The handle hierarchy, descriptor state machine, statement pipeline and
//! type catalog behind an ODBC driver that talks to ClickHouse over HTTP.
//! Queries are sent with the `ODBCDriver2` output format and parameters are
//! passed as typed server-side query parameters.
//!
//! # Example
//!
//! ```no_run
//! use clickhouse_odbc::{Driver, Result};
//!
//! fn main() -> Result<()> {
//!     let mut driver = Driver::new();
//!     let env = driver.alloc_environment();
//!     let dbc = driver.alloc_connection(env)?;
//!     driver.with_connection(dbc, |conn| {
//!         conn.connect("URL=http://localhost:8123/;UID=default;PWD=")
//!     })?;
//!
//!     let stmt = driver.alloc_statement(dbc)?;
//!     driver.with_statement(stmt, |stmt, conn| {
//!         stmt.execute_direct(conn, "SELECT number FROM system.numbers LIMIT 3", None)?;
//!         while stmt.advance_to_next_row()? {
//!             if let Some(row) = stmt.current_row() {
//!                 println!("{:?}", row.get(0));
//!             }
//!         }
//!         Ok(())
//!     })?;
//!
//!     driver.free_handle(env)
//! }
//! ```

pub mod attributes;
pub mod connect;
pub mod connection;
pub mod constants;
pub mod descriptor;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod escape;
pub mod handles;
pub mod result_set;
pub mod statement;
pub mod transport;
pub mod types;

// Re-export main types
pub use connect::ConnectParams;
pub use connection::Connection;
pub use descriptor::{DescField, Descriptor, DescriptorRecord, DescriptorRole};
pub use diagnostics::{DiagnosticRecord, Diagnostics};
pub use environment::Environment;
pub use error::{Error, Result};
pub use handles::{Driver, FreeStmtOption, Handle, HandleKind};
pub use result_set::{ResultMutator, ResultSet};
pub use statement::{ParamBinding, Statement, StmtAttr};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
pub use types::{Column, ColumnInfo, Row, TypeInfo, Value};
