//! Connection handle.

use crate::connect::ConnectParams;
use crate::descriptor::SharedDescriptor;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::handles::Handle;
use crate::transport::{HttpTransport, Transport};
use base64::Engine;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A connection to a ClickHouse server.
///
/// Owns its statements (by handle) and the descriptors the application
/// allocated on it.
pub struct Connection {
    environment: Handle,
    params: ConnectParams,
    transport: Option<Box<dyn Transport>>,
    /// Diagnostic area.
    pub diagnostics: Diagnostics,
    statements: BTreeSet<Handle>,
    descriptors: HashMap<Handle, SharedDescriptor>,
}

impl Connection {
    /// Create an unconnected connection.
    pub fn new(environment: Handle) -> Self {
        Self {
            environment,
            params: ConnectParams::default(),
            transport: None,
            diagnostics: Diagnostics::new(),
            statements: BTreeSet::new(),
            descriptors: HashMap::new(),
        }
    }

    /// Owning environment.
    pub fn environment(&self) -> Handle {
        self.environment
    }

    /// Connect using a connection string.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clickhouse_odbc::Driver;
    ///
    /// let mut driver = Driver::new();
    /// let env = driver.alloc_environment();
    /// let dbc = driver.alloc_connection(env)?;
    /// driver.with_connection(dbc, |conn| conn.connect("SERVER=localhost;PORT=8123;UID=default"))?;
    /// # Ok::<(), clickhouse_odbc::Error>(())
    /// ```
    pub fn connect(&mut self, conn_str: &str) -> Result<()> {
        let params = ConnectParams::parse(conn_str)?;
        self.connect_with_params(params)
    }

    /// Connect with explicit connection parameters over HTTP.
    pub fn connect_with_params(&mut self, params: ConnectParams) -> Result<()> {
        let transport = HttpTransport::new(params.timeout)?;
        self.connect_with_transport(params, Box::new(transport));
        Ok(())
    }

    /// Connect over a caller-supplied transport.
    pub fn connect_with_transport(&mut self, params: ConnectParams, transport: Box<dyn Transport>) {
        debug!(
            url = %params.url,
            database = %params.database,
            user = %params.user,
            retry_count = params.retry_count,
            "Connecting"
        );
        self.params = params;
        self.transport = Some(transport);
    }

    /// Drop the transport.
    pub fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!(url = %self.params.url, "Disconnected");
        }
    }

    /// Check if a transport is attached.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Connection parameters.
    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    /// Active transport.
    pub fn transport_mut(&mut self) -> Result<&mut dyn Transport> {
        match self.transport.as_mut() {
            Some(transport) => Ok(&mut **transport),
            None => Err(Error::ConnectionNotOpen),
        }
    }

    /// Number of retries after a transport failure.
    pub fn retry_count(&self) -> u32 {
        self.params.retry_count
    }

    /// Base64 of `user:password` for Basic authentication.
    pub fn credentials_string(&self) -> String {
        base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.params.user, self.params.password))
    }

    /// Client identification sent as `User-Agent`.
    pub fn user_agent(&self) -> String {
        format!(
            "clickhouse-odbc/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            whoami::platform(),
            whoami::distro()
        )
    }

    /// Drop the current HTTP session so the next request uses a fresh one.
    pub fn reset_session(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.reset();
        }
    }

    /// Statements allocated on this connection.
    pub fn statements(&self) -> impl Iterator<Item = Handle> + '_ {
        self.statements.iter().copied()
    }

    pub(crate) fn add_statement(&mut self, handle: Handle) {
        self.statements.insert(handle);
    }

    pub(crate) fn remove_statement(&mut self, handle: Handle) {
        self.statements.remove(&handle);
    }

    /// Descriptors allocated by the application on this connection.
    pub fn descriptors(&self) -> impl Iterator<Item = Handle> + '_ {
        self.descriptors.keys().copied()
    }

    /// Get an application-allocated descriptor.
    pub fn descriptor(&self, handle: Handle) -> Option<&SharedDescriptor> {
        self.descriptors.get(&handle)
    }

    pub(crate) fn add_descriptor(&mut self, handle: Handle, descriptor: SharedDescriptor) {
        self.descriptors.insert(handle, descriptor);
    }

    pub(crate) fn remove_descriptor(&mut self, handle: Handle) -> Option<SharedDescriptor> {
        self.descriptors.remove(&handle)
    }
}
