//! Synchronous protocol core for typed objects backed by remote JSON
//! resources.
//!
//! # Overview
//! A `Remote<T>` pairs a serde-serializable domain value with the resource
//! state tracked for it: where it lives (`location`) and which version we
//! hold (`etag`). `ResourceClient` runs the four synchronization operations
//! — fetch, create-child, update, delete — through a caller-supplied
//! [`http::Transport`], so the core itself never touches the network.
//!
//! # Design
//! - `builder` and `classify` are pure: request construction and response
//!   classification are deterministic functions, testable without I/O.
//! - The classifier's status tables are closed `match` expressions; callers
//!   get a closed error enum they can handle exhaustively.
//! - Updates and deletes are conditional (`if-match`) whenever an entity
//!   tag is known; a 412 reports the server's copy moved on.
//! - Types use owned `String` / `Vec` fields so requests and responses can
//!   cross thread boundaries freely.

pub mod builder;
pub mod classify;
pub mod client;
pub mod decode;
pub mod error;
pub mod http;
pub mod resource;

pub use classify::Success;
pub use client::ResourceClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use resource::{Remote, ResourceState};
