//! Response classification: the protocol's core decision table.
//!
//! # Design
//! [`classify`] is a pure function from a response to a typed outcome. The
//! checks run in a fixed order: the special error statuses short-circuit
//! first, then the status code is looked up in the closed content table,
//! then the location requirement is enforced, and content-type validation
//! applies only to statuses expected to carry content. Both status tables
//! are `match` expressions over a closed set so a new status cannot slip in
//! without a deliberate edit here.

use crate::error::ApiError;
use crate::http::HttpResponse;

/// A response the object can be updated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Success {
    /// 200 or 304 — the body holds the resource representation.
    Content,
    /// 204 — no body; the body is ignored even if one was sent.
    NoContent,
    /// 201, 301 or 302 — the body holds a representation and the `Location`
    /// header names where the resource lives.
    Located { location: String },
}

/// Map a response to a typed outcome.
///
/// `name` is the acting domain type's display name and `url` the request
/// target; both appear only in error messages. Classification never reads
/// the body except to pull a one-line diagnostic out of `text/plain` 400 and
/// 500 responses.
pub fn classify(name: &str, url: &str, response: &HttpResponse) -> Result<Success, ApiError> {
    let ctx = || (name.to_string(), url.to_string());

    match response.status {
        404 => {
            let (name, url) = ctx();
            return Err(ApiError::NotFound { name, url });
        }
        401 => {
            let (name, url) = ctx();
            return Err(ApiError::Unauthorized { name, url });
        }
        403 => {
            let (name, url) = ctx();
            return Err(ApiError::Forbidden { name, url });
        }
        412 => {
            let (name, url) = ctx();
            return Err(ApiError::PreconditionFailed { name, url });
        }
        400 | 500 => {
            let (name, url) = ctx();
            let reason = response.reason.clone();
            let diagnostic = plain_text_diagnostic(response);
            return Err(if response.status == 400 {
                ApiError::RequestError {
                    name,
                    url,
                    reason,
                    diagnostic,
                }
            } else {
                ApiError::ServerError {
                    name,
                    url,
                    reason,
                    diagnostic,
                }
            });
        }
        _ => {}
    }

    let has_content = match content_bearing(response.status) {
        Some(v) => v,
        None => {
            let (name, url) = ctx();
            return Err(ApiError::BadResponse {
                name,
                url,
                detail: format!("unexpected status {} {}", response.status, response.reason),
            });
        }
    };

    let location = if requires_location(response.status) {
        match response.header("location") {
            Some(l) => Some(l.to_string()),
            None => {
                let (name, url) = ctx();
                return Err(ApiError::BadResponse {
                    name,
                    url,
                    detail: format!(
                        "Location header missing from {} {} response",
                        response.status, response.reason
                    ),
                });
            }
        }
    } else {
        None
    };

    if !has_content {
        // then there is no content-type to check either
        return Ok(Success::NoContent);
    }

    let content_type = response.header("content-type").unwrap_or("");
    if media_type(content_type) != "application/json" {
        let (name, url) = ctx();
        return Err(ApiError::BadResponse {
            name,
            url,
            detail: format!("content-type is {content_type:?}, not JSON"),
        });
    }

    Ok(match location {
        Some(location) => Success::Located { location },
        None => Success::Content,
    })
}

/// Whether a status code's successful response carries a body. `None` means
/// the status is not part of the protocol at all.
fn content_bearing(status: u16) -> Option<bool> {
    match status {
        200 | 201 | 301 | 302 | 304 => Some(true),
        204 => Some(false),
        _ => None,
    }
}

/// Statuses that must name the resource's location in a `Location` header.
fn requires_location(status: u16) -> bool {
    matches!(status, 201 | 301 | 302)
}

/// The media type portion of a content-type value, parameters stripped.
pub(crate) fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or("").trim()
}

/// First line of a `text/plain` error body, if the response has one.
fn plain_text_diagnostic(response: &HttpResponse) -> Option<String> {
    let content_type = response.header("content-type")?;
    if media_type(content_type) != "text/plain" {
        return None;
    }
    let text = String::from_utf8_lossy(&response.body);
    let line = text.lines().next()?.trim_end().to_string();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
