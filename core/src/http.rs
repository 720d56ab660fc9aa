//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and interprets `HttpResponse` values
//! without ever opening a socket — a [`Transport`] implementation supplied by
//! the caller performs the actual exchange. This separation keeps the
//! protocol rules deterministic and easy to test against canned responses.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved
//! between threads or queued without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by the functions in [`crate::builder`]. A [`Transport`] executes it
/// against the network and returns the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON text for POST/PUT; `None` for GET/DELETE.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by a [`Transport`] after executing an `HttpRequest`, then
/// handed to [`crate::classify::classify`] for interpretation. The body is
/// kept as raw bytes because its character encoding is not trusted until
/// [`crate::decode::decode`] has looked at it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase from the status line, used in error messages.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }
}

fn lookup<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Error raised by a [`Transport`] when the exchange itself fails (connection
/// refused, timeout, interrupted body read). Distinct from the protocol error
/// taxonomy in [`crate::error`]: a transport error means no classifiable
/// response was obtained at all.
#[derive(Debug)]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError(message.into())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// The user agent collaborator executing one blocking request/response
/// exchange.
///
/// Implementations decide their own connection reuse, TLS, redirect and
/// timeout behavior; the protocol layer never retries and treats every
/// returned response as final. Implementations must be safe for concurrent
/// use if callers run operations on different objects concurrently.
pub trait Transport {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
