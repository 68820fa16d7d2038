//! HTTP Request body types

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Body of a dispatched request.
///
/// Bodies are plain owned data so a request can be replayed any number of
/// times; there is no single-use stream variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Serialized JSON document
    Json(String),
    /// Plain text
    Text(String),
    /// URL-encoded form fields, in order
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Creates a JSON body from raw JSON text.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::Json(content.into())
    }

    /// Serializes a value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` if the value cannot be serialized.
    pub fn json_value<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_string(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Creates a form body from key/value pairs.
    #[must_use]
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns whether the body is empty or none.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Json(content) | Self::Text(content) => content.is_empty(),
            Self::Form(fields) => fields.is_empty(),
        }
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Text(_) => Some("text/plain"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_value_body() {
        let body = RequestBody::json_value(&serde_json::json!({ "refresh_token": "R1" })).unwrap();
        assert_eq!(body, RequestBody::json(r#"{"refresh_token":"R1"}"#));
        assert_eq!(body.content_type(), Some("application/json"));
    }

    #[test]
    fn test_form_body() {
        let body = RequestBody::form([("username", "a@b.c"), ("password", "pw")]);
        assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
        assert!(!body.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let body = RequestBody::None;
        assert!(body.is_empty());
        assert_eq!(body.content_type(), None);
        assert!(RequestBody::Form(Vec::new()).is_empty());
    }
}
