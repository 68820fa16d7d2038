//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It resolves request paths against the configured API base URL and sends
//! headers exactly as the dispatcher prepared them.

use std::collections::HashMap;
use std::time::Instant;

use relay_application::ports::{HttpClient, HttpClientError};
use relay_domain::{ClientSettings, HttpMethod, RequestBody, RequestSpec, ResponseSpec};
use reqwest::{Client, Method};
use tracing::trace;

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` and implements the `HttpClient` port from the
/// application layer.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    settings: ClientSettings,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client for the backend described by `settings`.
    ///
    /// Default configuration:
    /// - Request timeout: `settings.request_timeout_ms`
    /// - Follow redirects: up to 10
    /// - User-Agent: "Relay/0.1.0"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: ClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent("Relay/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Encodes the request body, if any.
    fn encode_body(body: &RequestBody) -> Result<Option<String>, HttpClientError> {
        match body {
            RequestBody::None => Ok(None),
            RequestBody::Json(content) => {
                if !content.is_empty() {
                    let _: serde_json::Value = serde_json::from_str(content)
                        .map_err(|e| HttpClientError::InvalidBody(format!("Invalid JSON: {e}")))?;
                }
                Ok(Some(content.clone()))
            }
            RequestBody::Text(content) => Ok(Some(content.clone())),
            RequestBody::Form(fields) => serde_urlencoded::to_string(fields)
                .map(Some)
                .map_err(|e| HttpClientError::InvalidBody(format!("Failed to encode form: {e}"))),
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    pub(crate) fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }
        if error.is_connect() {
            return HttpClientError::ConnectionFailed(error.to_string());
        }
        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }
        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = self
            .settings
            .endpoint(&request.path)
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
        let timeout_ms = self.settings.request_timeout_ms;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        // Add Content-Type if body has one and not already set
        if let Some(content_type) = request.body.content_type()
            && !request.headers.contains("content-type")
        {
            builder = builder.header("Content-Type", content_type);
        }

        if let Some(body) = Self::encode_body(&request.body)? {
            builder = builder.body(body);
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Body(e.to_string()))?
            .to_vec();
        let duration = start.elapsed();

        trace!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "response received"
        );

        Ok(ResponseSpec::new(status, headers, body, duration))
    }
}
