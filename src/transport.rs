//! HTTP transport.
//!
//! The statement pipeline talks to the server through the [`Transport`]
//! trait: one POST per parameter set, the response body exposed as a blocking
//! reader. Retrying is the caller's job; the transport only provides
//! [`Transport::reset`] to drop pooled connections between attempts.

use bytes::Bytes;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// An outgoing query request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Full request URI, including query-string parameters.
    pub uri: reqwest::Url,
    /// Query text.
    pub body: String,
    /// `Authorization` header value.
    pub authorization: String,
    /// `User-Agent` header value.
    pub user_agent: String,
}

/// A received response.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, read on demand.
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    /// Create a response around an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Box::new(io::Cursor::new(body.into())),
        }
    }

    /// Read the whole body as text.
    pub fn into_text(mut self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Blocking request/response channel to the server.
pub trait Transport {
    /// Send a request and wait for the response headers.
    fn send(&mut self, request: &HttpRequest) -> io::Result<HttpResponse>;

    /// Drop the current session so the next request starts on a fresh connection.
    fn reset(&mut self);
}

/// `reqwest` based transport driven by a private runtime.
pub struct HttpTransport {
    runtime: Arc<Runtime>,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the given connect and read timeout.
    pub fn new(timeout: Duration) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let client = build_client(timeout)?;
        Ok(Self {
            runtime: Arc::new(runtime),
            client,
            timeout,
        })
    }
}

/// `timeout` bounds connecting and each wait for data, not the whole response.
fn build_client(timeout: Duration) -> io::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .build()
        .map_err(io::Error::other)
}

fn to_io_error(err: reqwest::Error) -> io::Error {
    if err.is_timeout() {
        io::Error::new(io::ErrorKind::TimedOut, err)
    } else if err.is_connect() {
        io::Error::new(io::ErrorKind::ConnectionRefused, err)
    } else {
        io::Error::other(err)
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: &HttpRequest) -> io::Result<HttpResponse> {
        debug!(
            method = "POST",
            uri = %request.uri,
            body = %request.body,
            user_agent = %request.user_agent,
            "Sending request"
        );

        // Single-chunk stream, sent with chunked transfer encoding.
        let chunk = Bytes::from(request.body.clone());
        let body = reqwest::Body::wrap_stream(futures::stream::iter(std::iter::once(Ok::<
            Bytes,
            io::Error,
        >(chunk))));

        let builder = self
            .client
            .post(request.uri.clone())
            .header(reqwest::header::CONNECTION, "Keep-Alive")
            .header(reqwest::header::AUTHORIZATION, &request.authorization)
            .header(reqwest::header::USER_AGENT, &request.user_agent)
            .body(body);

        // `send` registers its timers with the current runtime.
        let response = self
            .runtime
            .block_on(async { builder.send().await })
            .map_err(to_io_error)?;
        let status = response.status().as_u16();

        Ok(HttpResponse {
            status,
            body: Box::new(ResponseReader {
                runtime: Arc::clone(&self.runtime),
                response,
                chunk: Bytes::new(),
                finished: false,
            }),
        })
    }

    fn reset(&mut self) {
        debug!("Resetting HTTP session");
        match build_client(self.timeout) {
            Ok(client) => self.client = client,
            Err(e) => debug!(error = %e, "Keeping previous HTTP client"),
        }
    }
}

/// Blocking reader over a streaming response body.
struct ResponseReader {
    runtime: Arc<Runtime>,
    response: reqwest::Response,
    chunk: Bytes,
    finished: bool,
}

impl Read for ResponseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.chunk.is_empty() {
            if self.finished {
                return Ok(0);
            }
            match self
                .runtime
                .block_on(self.response.chunk())
                .map_err(to_io_error)?
            {
                Some(chunk) => self.chunk = chunk,
                None => self.finished = true,
            }
        }

        let n = buf.len().min(self.chunk.len());
        let head = self.chunk.split_to(n);
        buf[..n].copy_from_slice(&head);
        Ok(n)
    }
}
