//! Error types for the resource synchronization protocol.
//!
//! # Design
//! One variant per failure kind so callers can match exhaustively and attach
//! policy to specific cases (retry on `ServerError`, re-authenticate on
//! `Unauthorized`, re-fetch on `PreconditionFailed`). The HTTP variants carry
//! the request URL and the acting type's name so messages read like
//! "no such Note http://…". `NoLocation` is an invocation error — the caller
//! asked for an operation that needs a URL the object does not have — and is
//! raised before any request is built. `Transport` wraps failures from the
//! user agent collaborator, which sit outside the HTTP taxonomy.

use std::fmt;

use crate::http::TransportError;

/// Errors returned by synchronization operations.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the resource does not exist.
    NotFound { name: String, url: String },

    /// The server returned 401 — the request was not authenticated.
    /// The caller may succeed by retrying with credentials.
    Unauthorized { name: String, url: String },

    /// The server returned 403 — the client, as authenticated, may not
    /// access this resource. Retrying as-is cannot succeed.
    Forbidden { name: String, url: String },

    /// The server returned 412 — a conditional request failed, most often a
    /// `PUT` carrying an entity tag for a resource that has since changed.
    PreconditionFailed { name: String, url: String },

    /// The server returned 400. `diagnostic` holds the first line of a
    /// `text/plain` body when the server supplied one.
    RequestError {
        name: String,
        url: String,
        reason: String,
        diagnostic: Option<String>,
    },

    /// The server returned 500. `diagnostic` as for `RequestError`.
    ServerError {
        name: String,
        url: String,
        reason: String,
        diagnostic: Option<String>,
    },

    /// The response does not fit the protocol: an unexpected status code, a
    /// missing `Location` header, or a non-JSON content type.
    BadResponse {
        name: String,
        url: String,
        detail: String,
    },

    /// The response body claimed to be JSON but both decode passes failed.
    Decode(String),

    /// The outgoing payload could not be serialized to JSON.
    Serialize(String),

    /// The operation needs a resource location the object does not have.
    NoLocation {
        verb: &'static str,
        name: &'static str,
    },

    /// A link target could not be resolved against the object's location.
    InvalidUrl(String),

    /// The transport collaborator failed before a response was obtained.
    Transport(TransportError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { name, url } => write!(f, "no such {name} {url}"),
            ApiError::Unauthorized { name, url } => {
                write!(f, "not authorized to fetch {name} {url}")
            }
            ApiError::Forbidden { name, url } => {
                write!(f, "forbidden from fetching {name} {url}")
            }
            ApiError::PreconditionFailed { name, url } => {
                write!(f, "precondition failed for {name} request to {url}")
            }
            ApiError::RequestError {
                name,
                url,
                reason,
                diagnostic,
            } => match diagnostic {
                Some(d) => write!(f, "400 {reason} requesting {name} {url}: {d}"),
                None => write!(f, "400 {reason} requesting {name} {url}"),
            },
            ApiError::ServerError {
                name,
                url,
                reason,
                diagnostic,
            } => match diagnostic {
                Some(d) => write!(f, "500 {reason} requesting {name} {url}: {d}"),
                None => write!(f, "500 {reason} requesting {name} {url}"),
            },
            ApiError::BadResponse { name, url, detail } => {
                write!(f, "bad response requesting {name} {url}: {detail}")
            }
            ApiError::Decode(msg) => write!(f, "could not decode response body: {msg}"),
            ApiError::Serialize(msg) => write!(f, "could not serialize request body: {msg}"),
            ApiError::NoLocation { verb, name } => {
                write!(f, "cannot {verb} {name} with no known location")
            }
            ApiError::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            ApiError::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err)
    }
}
