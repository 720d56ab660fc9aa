//! Response body decoding with a lenient second pass.
//!
//! # Design
//! Pass one treats the body as strict UTF-8 JSON. Pass two runs only when
//! pass one failed because the bytes are not valid UTF-8 — a server that
//! labels its output JSON but emits it in some other character encoding.
//! In that case the bytes are re-read lossily (bad sequences become U+FFFD)
//! and parsed again. Malformed JSON in valid UTF-8 never reaches pass two;
//! tolerating bad encodings is not the same as tolerating bad syntax.

use crate::error::ApiError;

/// Decode a response body into a generic JSON value.
pub fn decode(bytes: &[u8]) -> Result<serde_json::Value, ApiError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string())),
        Err(_) => {
            let text = String::from_utf8_lossy(bytes);
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
        }
    }
}
