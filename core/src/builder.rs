//! Request building for each synchronization operation.
//!
//! # Design
//! Pure functions from operation inputs to `HttpRequest` values; the
//! synchronizer supplies the target URL and entity tag from the object's
//! tracked state. Every request asks for JSON unless the caller's override
//! slice already names an `accept` header. Outgoing bodies are serialized
//! through a generic JSON value so top-level null fields can be dropped
//! regardless of how the domain type derives `Serialize`.

use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// GET a resource representation. The URL is the caller's target, not
/// necessarily the object's own location.
pub fn build_fetch(url: &str, overrides: &[(String, String)]) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: url.to_string(),
        headers: base_headers(overrides),
        body: None,
    }
}

/// POST a child's fields to the parent resource at `parent_location`.
pub fn build_create_child<C: Serialize>(
    parent_location: &str,
    child: &C,
    overrides: &[(String, String)],
) -> Result<HttpRequest, ApiError> {
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: parent_location.to_string(),
        headers: base_headers(overrides),
        body: Some(json_body(child)?),
    })
}

/// PUT an object's full field set back to its own location, conditionally
/// when an entity tag is known.
pub fn build_update<T: Serialize>(
    location: &str,
    etag: Option<&str>,
    object: &T,
    overrides: &[(String, String)],
) -> Result<HttpRequest, ApiError> {
    let mut headers = base_headers(overrides);
    if let Some(etag) = etag {
        headers.push(("if-match".to_string(), etag.to_string()));
    }
    Ok(HttpRequest {
        method: HttpMethod::Put,
        url: location.to_string(),
        headers,
        body: Some(json_body(object)?),
    })
}

/// DELETE the resource at its own location, conditionally when an entity
/// tag is known.
pub fn build_delete(location: &str, etag: Option<&str>, overrides: &[(String, String)]) -> HttpRequest {
    let mut headers = base_headers(overrides);
    if let Some(etag) = etag {
        headers.push(("if-match".to_string(), etag.to_string()));
    }
    HttpRequest {
        method: HttpMethod::Delete,
        url: location.to_string(),
        headers,
        body: None,
    }
}

/// Default headers plus caller overrides. The `accept: application/json`
/// default is suppressed when an override supplies its own `accept`.
fn base_headers(overrides: &[(String, String)]) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(overrides.len() + 1);
    if !overrides.iter().any(|(k, _)| k.eq_ignore_ascii_case("accept")) {
        headers.push(("accept".to_string(), "application/json".to_string()));
    }
    headers.extend(overrides.iter().cloned());
    headers
}

/// Serialize to a JSON object with top-level null fields omitted.
fn json_body<T: Serialize>(value: &T) -> Result<String, ApiError> {
    let mut json = serde_json::to_value(value).map_err(|e| ApiError::Serialize(e.to_string()))?;
    if let serde_json::Value::Object(fields) = &mut json {
        fields.retain(|_, v| !v.is_null());
    }
    serde_json::to_string(&json).map_err(|e| ApiError::Serialize(e.to_string()))
}
