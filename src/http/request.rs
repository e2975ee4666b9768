//! Outbound request descriptors

use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;

/// A logical request, as issued by the application.
///
/// The descriptor outlives a single transmission: when the pipeline replays
/// it after a token refresh it is rebuilt from these fields, with the
/// retry flag set so it can never be refreshed a second time.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub url: String,
    /// Request headers (override the client's default headers)
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    pub(crate) retry_attempted: bool,
}

impl RequestDescriptor {
    /// Create a new descriptor
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            query: HashMap::new(),
            body: None,
            retry_attempted: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether this descriptor has already been through a refresh
    pub fn retry_attempted(&self) -> bool {
        self.retry_attempted
    }

    /// Set `Authorization: Bearer <token>`, replacing any existing
    /// authorization header regardless of case
    pub fn set_bearer(&mut self, token: &str) {
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));
    }
}
