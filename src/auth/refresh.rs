//! Access token refresh
//!
//! The refresh call is a dedicated, unauthenticated POST. It never goes
//! through the pipeline, so it carries no bearer token and can never trigger
//! a refresh of its own.

use crate::error::ApiError;
use crate::http::{parse_body, status_message};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path of the refresh endpoint, relative to the API origin
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Derive the refresh endpoint from the configured API base URL.
///
/// Only an exact trailing `/api` is stripped before the refresh path is
/// appended; any other path is kept as-is.
pub fn refresh_url(base_url: &str) -> String {
    let origin = base_url.strip_suffix("/api").unwrap_or(base_url);
    format!("{origin}{REFRESH_PATH}")
}

/// Body sent to the refresh endpoint
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

/// Successful refresh response
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// The new access token
    pub token: String,
}

/// Exchanges a refresh token for a new access token
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client: Client,
    url: String,
}

impl TokenRefresher {
    /// Create a refresher for the given API base URL
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: refresh_url(base_url),
        }
    }

    /// Refresh endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request a new access token.
    ///
    /// Rejections, network failures, timeouts and responses without a
    /// `token` are all failures.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        debug!(url = %self.url, "Requesting new access token");

        let response = self
            .client
            .post(&self.url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        let data = parse_body(&bytes);

        if !status.is_success() {
            return Err(ApiError::normalize(
                Some(status.as_u16()),
                data,
                Some(status_message(status)),
            ));
        }

        let token = data
            .as_ref()
            .and_then(|body| serde_json::from_value::<RefreshResponse>(body.clone()).ok())
            .map(|r| r.token)
            .filter(|t| !t.is_empty());

        token.ok_or_else(|| {
            ApiError::normalize(
                Some(status.as_u16()),
                data,
                Some("Refresh response did not contain a token".to_string()),
            )
        })
    }
}
