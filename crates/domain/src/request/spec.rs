//! Request specification type

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AUTHORIZATION, Header, Headers, HttpMethod, RequestBody};
use crate::credential::bearer;
use crate::error::{DomainError, DomainResult};

/// A replayable description of one backend call.
///
/// The path is relative to the configured API base (e.g. `/auth/me`). The
/// spec is plain data, so the dispatcher can resend it after a token
/// refresh without the caller noticing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Identifier used to correlate attempts and replays in logs.
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base, starting with `/`
    pub path: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
}

impl RequestSpec {
    /// Creates a request with the given method and path.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            headers: Headers::new(),
            body: RequestBody::None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Returns a copy carrying `access_token` as bearer credential, or no
    /// `Authorization` header at all when the token is absent or empty.
    #[must_use]
    pub fn authorized(&self, access_token: Option<&str>) -> Self {
        let mut request = self.clone();
        match access_token.filter(|token| !token.is_empty()) {
            Some(token) => request.headers.set(AUTHORIZATION, bearer(token)),
            None => request.headers.remove(AUTHORIZATION),
        }
        request
    }

    /// Checks the path and header names before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not relative to the API base or a
    /// header name is malformed.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.path.starts_with('/') || self.path.contains("://") {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        self.headers.iter().try_for_each(Header::validate)
    }
}
