//! Tracked resource identity: location and entity tag.
//!
//! # Design
//! `ResourceState` keeps its fields private so the two invariants hold by
//! construction: an entity tag never exists without a location, and state
//! only changes through the synchronizer's success paths (the mutators are
//! `pub(crate)`). "Deleted" is modeled as both fields set back to `None`,
//! never as removing anything.

use url::Url;

use crate::error::ApiError;

/// Where a resource lives on the server and which version of it we hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    location: Option<String>,
    etag: Option<String>,
}

impl ResourceState {
    /// URI of the resource, if it has been fetched, created or saved.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Entity tag for conditional updates and deletes, if the server sent one.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub(crate) fn set(&mut self, location: String, etag: Option<String>) {
        self.location = Some(location);
        self.etag = etag;
    }

    /// Replace the entity tag without touching the location. A tag for an
    /// unlocated resource is meaningless, so this is a no-op until the
    /// resource is located.
    pub(crate) fn refresh_etag(&mut self, etag: String) {
        if self.location.is_some() {
            self.etag = Some(etag);
        }
    }

    /// Disconnect from the server-side resource. Clearing an absent entity
    /// tag is a no-op, not a fault.
    pub(crate) fn clear(&mut self) {
        self.location = None;
        self.etag = None;
    }
}

/// A domain value paired with its tracked resource state.
///
/// The synchronizer is the only mutator of the state; the domain value is
/// replaced wholesale from decoded response content on every successful
/// operation that returns a body. Operations that mutate state take `&mut
/// Remote<T>`, so the borrow checker already prevents two in-flight
/// operations on the same object.
#[derive(Debug, Clone)]
pub struct Remote<T> {
    data: T,
    state: ResourceState,
}

impl<T> Remote<T> {
    /// Wrap a local value that has no server-side counterpart yet.
    pub fn new(data: T) -> Self {
        Remote {
            data,
            state: ResourceState::default(),
        }
    }

    pub(crate) fn from_parts(data: T, state: ResourceState) -> Self {
        Remote { data, state }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutable access to the domain value, for staging local edits before
    /// an update.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn location(&self) -> Option<&str> {
        self.state.location()
    }

    pub fn etag(&self) -> Option<&str> {
        self.state.etag()
    }

    pub(crate) fn state_mut(&mut self) -> &mut ResourceState {
        &mut self.state
    }

    pub(crate) fn replace(&mut self, data: T, location: String, etag: Option<String>) {
        self.data = data;
        self.state.set(location, etag);
    }

    /// Resolve a possibly-relative link target against this resource's
    /// location, RFC 3986 style: a location of `http://example.com/dwar`
    /// joined with `asf` yields `http://example.com/asf`.
    pub fn link_url(&self, relative: &str) -> Result<String, ApiError> {
        let base = self.state.location().ok_or(ApiError::NoLocation {
            verb: "resolve a link from",
            name: display_name::<T>(),
        })?;
        let joined = Url::parse(base)
            .and_then(|base| base.join(relative))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(joined.to_string())
    }
}

/// Last path segment of a type's name, for error messages.
pub(crate) fn display_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
