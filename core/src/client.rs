//! Synchronizer: one logical operation per call against a remote resource.
//!
//! # Design
//! `ResourceClient` composes the pure pieces — request builder, transport,
//! classifier, decoder — into the four operations. Each call is a single
//! blocking exchange: build, send, classify, then either apply the result to
//! the object's data and tracked state or propagate a typed error. Nothing
//! here retries; callers own that policy. Failed operations leave the
//! object's state untouched, and only a confirmed delete clears it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder;
use crate::classify::{classify, Success};
use crate::decode::decode;
use crate::error::ApiError;
use crate::http::{HttpResponse, Transport};
use crate::resource::{display_name, Remote, ResourceState};

/// Synchronizes `Remote<T>` objects with their server-side resources through
/// a caller-supplied [`Transport`].
#[derive(Debug, Clone)]
pub struct ResourceClient<H> {
    transport: H,
}

impl<H: Transport> ResourceClient<H> {
    pub fn new(transport: H) -> Self {
        ResourceClient { transport }
    }

    pub fn transport(&self) -> &H {
        &self.transport
    }

    /// Fetch a new `Remote<T>` from a URL.
    pub fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Remote<T>, ApiError> {
        self.fetch_with_headers(url, &[])
    }

    /// Fetch with extra request headers; an override named `accept` replaces
    /// the default `accept: application/json`.
    pub fn fetch_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        overrides: &[(String, String)],
    ) -> Result<Remote<T>, ApiError> {
        let request = builder::build_fetch(url, overrides);
        log::debug!("fetching {url}");
        let response = self.transport.request(&request)?;
        let (data, state) = absorb::<T>(display_name::<T>(), url, &response)?;
        Ok(Remote::from_parts(data, state))
    }

    /// Fetch the resource a link on `object` points at, resolving the
    /// possibly-relative target against the object's location.
    pub fn fetch_linked<T, L: DeserializeOwned>(
        &self,
        object: &Remote<T>,
        relative: &str,
    ) -> Result<Remote<L>, ApiError> {
        let url = object.link_url(relative)?;
        self.fetch(&url)
    }

    /// Add a child resource under `parent` through a `POST`, for example an
    /// entry posted to a collection. The returned `Remote<C>` holds the
    /// server's representation of the child, located by the response.
    pub fn create_child<P, C>(&self, parent: &Remote<P>, child: C) -> Result<Remote<C>, ApiError>
    where
        C: Serialize + DeserializeOwned,
    {
        let parent_url = parent.location().ok_or(ApiError::NoLocation {
            verb: "post a child to",
            name: display_name::<P>(),
        })?;
        let request = builder::build_create_child(parent_url, &child, &[])?;
        log::debug!("posting new {} to {parent_url}", display_name::<C>());
        let response = self.transport.request(&request)?;
        let (data, state) = absorb::<C>(display_name::<C>(), parent_url, &response)?;
        Ok(Remote::from_parts(data, state))
    }

    /// Save a previously fetched or created object back to its resource
    /// through a conditional `PUT`. A `PreconditionFailed` error means the
    /// server's copy changed since this object's entity tag was obtained.
    pub fn update<T>(&self, object: &mut Remote<T>) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        let name = display_name::<T>();
        let url = object
            .location()
            .ok_or(ApiError::NoLocation { verb: "save", name })?
            .to_string();
        let request = builder::build_update(&url, object.etag(), object.data(), &[])?;
        log::debug!("saving {name} to {url}");
        let response = self.transport.request(&request)?;

        match classify(name, &url, &response)? {
            Success::NoContent => {
                // Our representation stands; only the entity tag can move.
                if let Some(etag) = response.header("etag") {
                    object.state_mut().refresh_etag(etag.to_string());
                }
                Ok(())
            }
            outcome => {
                let location = match outcome {
                    Success::Located { location } => location,
                    _ => url,
                };
                let value = decode(&response.body)?;
                let data =
                    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
                let etag = response
                    .header("etag")
                    .or(object.etag())
                    .map(str::to_string);
                object.replace(data, location, etag);
                Ok(())
            }
        }
    }

    /// Remove the server-side resource through a conditional `DELETE`. On
    /// success the object is disconnected: location and entity tag become
    /// absent. The response body, if any, is never parsed.
    pub fn delete<T>(&self, object: &mut Remote<T>) -> Result<(), ApiError> {
        let name = display_name::<T>();
        let url = object
            .location()
            .ok_or(ApiError::NoLocation {
                verb: "delete",
                name,
            })?
            .to_string();
        let request = builder::build_delete(&url, object.etag(), &[]);
        log::debug!("deleting {name} at {url}");
        let response = self.transport.request(&request)?;
        classify(name, &url, &response)?;
        object.state_mut().clear();
        Ok(())
    }
}

/// Decode a successful response into a fresh value plus its resource state.
/// `url` is the fallback location when the response does not name one. A 204
/// has no body to build a value from, so it surfaces here as a decode
/// failure like any other unparseable content.
fn absorb<T: DeserializeOwned>(
    name: &str,
    url: &str,
    response: &HttpResponse,
) -> Result<(T, ResourceState), ApiError> {
    let outcome = classify(name, url, response)?;
    let location = match outcome {
        Success::Located { location } => location,
        Success::Content | Success::NoContent => url.to_string(),
    };
    let value = decode(&response.body)?;
    let data = serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?;
    let mut state = ResourceState::default();
    state.set(location, response.header("etag").map(str::to_string));
    Ok((data, state))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, TransportError};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct What {
        what: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        title: String,
        body: Option<String>,
    }

    /// Transport returning canned responses in order, recording every
    /// request it saw.
    struct Scripted {
        responses: RefCell<VecDeque<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn one(response: HttpResponse) -> Self {
            Self::many(vec![response])
        }

        fn many(responses: Vec<HttpResponse>) -> Self {
            Scripted {
                responses: RefCell::new(responses.into()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.borrow().clone()
        }
    }

    impl Transport for Scripted {
        fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| TransportError::new("no scripted response left"))
        }
    }

    fn json_response(status: u16, body: &str, extra: &[(&str, &str)]) -> HttpResponse {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        HttpResponse {
            status,
            reason: String::new(),
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    fn bare_response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            reason: String::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    fn located_note(title: &str, location: &str, etag: Option<&str>) -> Remote<Note> {
        let mut state = ResourceState::default();
        state.set(location.to_string(), etag.map(str::to_string));
        Remote::from_parts(
            Note {
                title: title.to_string(),
                body: None,
            },
            state,
        )
    }

    #[test]
    fn fetch_applies_content_and_requested_url() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"what":"hi"}"#,
            &[],
        )));
        let what: Remote<What> = client.fetch("http://x/a").unwrap();
        assert_eq!(what.data().what, "hi");
        assert_eq!(what.location(), Some("http://x/a"));
        assert!(what.etag().is_none());

        let sent = client.transport().requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://x/a");
        assert_eq!(sent[0].header("accept"), Some("application/json"));
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn fetch_records_entity_tag() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"what":"hi"}"#,
            &[("ETag", "\"v1\"")],
        )));
        let what: Remote<What> = client.fetch("http://x/a").unwrap();
        assert_eq!(what.etag(), Some("\"v1\""));
    }

    #[test]
    fn fetch_takes_location_from_redirect_header() {
        let client = ResourceClient::new(Scripted::one(json_response(
            301,
            r#"{"what":"hi"}"#,
            &[("Location", "http://x/b")],
        )));
        let what: Remote<What> = client.fetch("http://x/a").unwrap();
        assert_eq!(what.location(), Some("http://x/b"));
    }

    #[test]
    fn fetch_html_is_a_bad_response() {
        let mut resp = json_response(200, "<html>", &[]);
        resp.headers[0].1 = "text/html".to_string();
        let client = ResourceClient::new(Scripted::one(resp));
        let err = client.fetch::<What>("http://x/a").unwrap_err();
        assert!(matches!(err, ApiError::BadResponse { .. }));
    }

    #[test]
    fn fetch_surfaces_transport_failures() {
        let client = ResourceClient::new(Scripted::many(Vec::new()));
        let err = client.fetch::<What>("http://x/a").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn fetch_with_headers_passes_overrides() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"what":"hi"}"#,
            &[],
        )));
        let overrides = vec![("authorization".to_string(), "Bearer t".to_string())];
        let _: Remote<What> = client
            .fetch_with_headers("http://x/a", &overrides)
            .unwrap();
        let sent = client.transport().requests();
        assert_eq!(sent[0].header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn create_child_locates_the_child_from_the_header() {
        let client = ResourceClient::new(Scripted::one(json_response(
            201,
            r#"{"title":"n","body":null}"#,
            &[("Location", "http://x/coll/1"), ("ETag", "\"c1\"")],
        )));
        let parent = located_note("folder", "http://x/coll", None);
        let child = client
            .create_child(
                &parent,
                Note {
                    title: "n".to_string(),
                    body: None,
                },
            )
            .unwrap();
        assert_eq!(child.location(), Some("http://x/coll/1"));
        assert_eq!(child.etag(), Some("\"c1\""));
        assert_eq!(child.data().title, "n");

        let sent = client.transport().requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "http://x/coll");
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert!(body.get("body").is_none(), "null field must be omitted");
    }

    #[test]
    fn create_child_under_unlocated_parent_sends_nothing() {
        let client = ResourceClient::new(Scripted::many(Vec::new()));
        let parent = Remote::new(Note {
            title: "folder".to_string(),
            body: None,
        });
        let err = client
            .create_child(
                &parent,
                Note {
                    title: "n".to_string(),
                    body: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::NoLocation { .. }));
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn update_sends_if_match_and_learns_the_fresh_tag() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"title":"renamed","body":null}"#,
            &[("ETag", "\"v2\"")],
        )));
        let mut note = located_note("n", "http://x/a", Some("\"v1\""));
        client.update(&mut note).unwrap();
        assert_eq!(note.etag(), Some("\"v2\""));
        assert_eq!(note.data().title, "renamed");
        assert_eq!(note.location(), Some("http://x/a"));

        let sent = client.transport().requests();
        assert_eq!(sent[0].method, HttpMethod::Put);
        assert_eq!(sent[0].header("if-match"), Some("\"v1\""));
    }

    #[test]
    fn update_keeps_the_tag_when_the_response_has_none() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"title":"n","body":null}"#,
            &[],
        )));
        let mut note = located_note("n", "http://x/a", Some("\"v1\""));
        client.update(&mut note).unwrap();
        assert_eq!(note.etag(), Some("\"v1\""));
    }

    #[test]
    fn update_no_content_keeps_local_fields() {
        let mut resp = bare_response(204);
        resp.headers
            .push(("ETag".to_string(), "\"v2\"".to_string()));
        let client = ResourceClient::new(Scripted::one(resp));
        let mut note = located_note("kept", "http://x/a", Some("\"v1\""));
        client.update(&mut note).unwrap();
        assert_eq!(note.data().title, "kept");
        assert_eq!(note.etag(), Some("\"v2\""));
    }

    #[test]
    fn update_precondition_failure_leaves_everything_untouched() {
        let client = ResourceClient::new(Scripted::one(bare_response(412)));
        let mut note = located_note("n", "http://x/a", Some("\"v1\""));
        let err = client.update(&mut note).unwrap_err();
        assert!(matches!(err, ApiError::PreconditionFailed { .. }));
        assert_eq!(note.data().title, "n");
        assert_eq!(note.location(), Some("http://x/a"));
        assert_eq!(note.etag(), Some("\"v1\""));
    }

    #[test]
    fn update_without_location_is_an_invocation_error() {
        let client = ResourceClient::new(Scripted::many(Vec::new()));
        let mut note = Remote::new(Note {
            title: "n".to_string(),
            body: None,
        });
        let err = client.update(&mut note).unwrap_err();
        assert!(matches!(err, ApiError::NoLocation { verb: "save", .. }));
    }

    #[test]
    fn delete_clears_location_and_tag() {
        let client = ResourceClient::new(Scripted::one(bare_response(204)));
        let mut note = located_note("n", "http://x/a", Some("\"v1\""));
        client.delete(&mut note).unwrap();
        assert!(note.location().is_none());
        assert!(note.etag().is_none());

        let sent = client.transport().requests();
        assert_eq!(sent[0].method, HttpMethod::Delete);
        assert_eq!(sent[0].header("if-match"), Some("\"v1\""));
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn delete_without_a_tag_sends_no_condition() {
        let client = ResourceClient::new(Scripted::one(bare_response(204)));
        let mut note = located_note("n", "http://x/a", None);
        client.delete(&mut note).unwrap();
        assert_eq!(client.transport().requests()[0].header("if-match"), None);
    }

    #[test]
    fn delete_accepts_a_redirect_and_never_parses_the_body() {
        let resp = json_response(302, "certainly not json", &[("Location", "http://x/b")]);
        let client = ResourceClient::new(Scripted::one(resp));
        let mut note = located_note("n", "http://x/a", None);
        client.delete(&mut note).unwrap();
        assert!(note.location().is_none());
    }

    #[test]
    fn delete_failure_leaves_state_untouched() {
        let client = ResourceClient::new(Scripted::one(bare_response(500)));
        let mut note = located_note("n", "http://x/a", Some("\"v1\""));
        let err = client.delete(&mut note).unwrap_err();
        assert!(matches!(err, ApiError::ServerError { .. }));
        assert_eq!(note.location(), Some("http://x/a"));
        assert_eq!(note.etag(), Some("\"v1\""));
    }

    #[test]
    fn fetch_linked_resolves_against_the_location() {
        let client = ResourceClient::new(Scripted::one(json_response(
            200,
            r#"{"what":"what!"}"#,
            &[],
        )));
        let linky = located_note("awesome", "http://example.com/dwar", None);
        let what: Remote<What> = client.fetch_linked(&linky, "asf").unwrap();
        assert_eq!(what.data().what, "what!");
        assert_eq!(what.location(), Some("http://example.com/asf"));
        assert_eq!(client.transport().requests()[0].url, "http://example.com/asf");
    }
}
