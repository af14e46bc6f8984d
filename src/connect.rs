//! Connection parameters.

use crate::error::{Error, Result};
use std::time::Duration;

/// Default server URL.
pub const DEFAULT_URL: &str = "http://localhost:8123/";
/// Default connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of retries after a transport failure.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Server URL (scheme, host, port and path).
    pub url: String,
    /// Default database.
    pub database: String,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Connect timeout, and the longest wait for any piece of the response.
    pub timeout: Duration,
    /// Retries after a transport failure.
    pub retry_count: u32,
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl ConnectParams {
    /// Create new connection parameters.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: "default".to_string(),
            user: "default".to_string(),
            password: String::new(),
            timeout: DEFAULT_TIMEOUT,
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }

    /// Set the credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the default database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the connect and read timeout.
    ///
    /// # Example
    ///
    /// ```
    /// use clickhouse_odbc::ConnectParams;
    /// use std::time::Duration;
    ///
    /// let params = ConnectParams::default().with_timeout(Duration::from_secs(5));
    /// assert_eq!(params.timeout, Duration::from_secs(5));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Parse a connection string like `SERVER=host;PORT=8123;UID=user;PWD=secret`.
    pub fn parse(conn_str: &str) -> Result<Self> {
        let mut params = Self::default();
        let mut url = None;
        let mut server = None;
        let mut port = None;

        for pair in conn_str.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::InvalidConnectString {
                    message: format!("Expected KEY=value, got: {}", pair),
                })?;
            let value = unbrace(value.trim());

            match key.trim().to_ascii_uppercase().as_str() {
                "URL" => url = Some(value.to_string()),
                "SERVER" | "HOST" => server = Some(value.to_string()),
                "PORT" => {
                    port = Some(value.parse::<u16>().map_err(|_| Error::InvalidConnectString {
                        message: format!("Invalid port: {}", value),
                    })?)
                }
                "DATABASE" => params.database = value.to_string(),
                "UID" | "USER" => params.user = value.to_string(),
                "PWD" | "PASSWORD" => params.password = value.to_string(),
                "TIMEOUT" => {
                    let secs = value.parse::<u64>().map_err(|_| Error::InvalidConnectString {
                        message: format!("Invalid timeout: {}", value),
                    })?;
                    params.timeout = Duration::from_secs(secs);
                }
                "RETRY_COUNT" => {
                    params.retry_count =
                        value.parse::<u32>().map_err(|_| Error::InvalidConnectString {
                            message: format!("Invalid retry count: {}", value),
                        })?;
                }
                // DSN and driver-manager keys
                _ => {}
            }
        }

        params.url = match (url, server) {
            (Some(url), _) => url,
            (None, Some(server)) => format!("http://{}:{}/", server, port.unwrap_or(8123)),
            (None, None) => match port {
                Some(port) => format!("http://localhost:{}/", port),
                None => DEFAULT_URL.to_string(),
            },
        };

        Ok(params)
    }
}

fn unbrace(value: &str) -> &str {
    value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value)
}
