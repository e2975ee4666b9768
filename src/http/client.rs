//! Authenticated API client
//!
//! Drives each logical request through an explicit auth state machine:
//!
//! ```text
//! Initial --2xx--> Done
//! Initial --401, not yet retried--> Refreshing --token--> Retrying --> Done
//!                                   Refreshing --failure--> LoggedOut
//! ```
//!
//! Anything else (other statuses, a second 401, no refresh token, network
//! errors, timeouts) is normalized and returned to the caller.

use super::request::RequestDescriptor;
use super::response::{parse_body, status_message, ApiResponse};
use crate::auth::{Navigator, TokenRefresher};
use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::storage::CredentialStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Where a logical request is in the auth recovery flow
#[derive(Debug)]
enum AuthState {
    /// First transmission
    Initial,
    /// First 401 received; the original failure is kept in case no refresh
    /// token is available
    Refreshing(ApiError),
    /// Replaying with the refreshed token
    Retrying,
    /// Refresh failed; credentials are about to be cleared
    LoggedOut(ApiError),
    Done(ApiResponse),
}

/// HTTP client that authenticates requests and recovers from expired tokens
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresher: TokenRefresher,
}

impl ApiClient {
    /// Create a client with its own transport
    pub fn new(
        config: ClientConfig,
        credentials: impl CredentialStore + 'static,
        navigator: impl Navigator + 'static,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Request)?;

        Ok(Self::with_client(client, config, credentials, navigator))
    }

    /// Create a client over an existing transport
    pub fn with_client(
        client: Client,
        config: ClientConfig,
        credentials: impl CredentialStore + 'static,
        navigator: impl Navigator + 'static,
    ) -> Self {
        let refresher = TokenRefresher::new(client.clone(), &config.base_url);
        Self {
            client,
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            navigator: Arc::new(navigator),
            refresher,
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Refresh endpoint used on a first 401
    pub fn refresh_url(&self) -> &str {
        self.refresher.url()
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::get(url)).await
    }

    /// Make a POST request with a JSON body
    pub async fn post(&self, url: &str, body: Value) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::post(url).json(body)).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, body: Value) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::put(url).json(body)).await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch(&self, url: &str, body: Value) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::patch(url).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<ApiResponse> {
        self.execute(RequestDescriptor::delete(url)).await
    }

    /// Make a request and parse the JSON response
    pub async fn request_json<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Make a GET request and parse the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(RequestDescriptor::get(url)).await
    }

    /// Run a request through the pipeline.
    ///
    /// Resolves with the response (possibly from the replay after a refresh),
    /// or fails with:
    /// - a construction error, unmodified, if the request could not be built
    /// - [`Error::Api`] for every failed exchange
    /// - [`Error::SessionExpired`] if the refresh failed and the user was
    ///   signed out
    pub async fn execute(&self, mut request: RequestDescriptor) -> Result<ApiResponse> {
        let mut state = AuthState::Initial;

        loop {
            state = match state {
                AuthState::Initial | AuthState::Retrying => match self.dispatch(&request).await? {
                    Ok(response) => AuthState::Done(response),
                    Err(err) if err.is_unauthorized() && !request.retry_attempted => {
                        AuthState::Refreshing(err)
                    }
                    Err(err) => return Err(self.reject(&request, err)),
                },

                AuthState::Refreshing(original) => {
                    request.retry_attempted = true;

                    let Some((scope, refresh_token)) = self.credentials.refresh_token().await
                    else {
                        debug!(url = %request.url, "Received 401 with no refresh token stored");
                        return Err(self.reject(&request, original));
                    };

                    match self.refresher.refresh(&refresh_token).await {
                        Ok(token) => {
                            self.credentials.set_access_token(scope, &token).await?;
                            request.set_bearer(&token);
                            info!(%scope, url = %request.url, "Access token refreshed, replaying request");
                            AuthState::Retrying
                        }
                        Err(err) => AuthState::LoggedOut(err),
                    }
                }

                AuthState::LoggedOut(err) => {
                    self.sign_out(&err).await;
                    return Err(Error::SessionExpired(err));
                }

                AuthState::Done(response) => return Ok(response),
            };
        }
    }

    /// Send one transmission of a request.
    ///
    /// The outer error is a construction failure; the inner result is the
    /// outcome of the exchange, already normalized on failure.
    async fn dispatch(
        &self,
        request: &RequestDescriptor,
    ) -> Result<std::result::Result<ApiResponse, ApiError>> {
        let req = self.intercept_request(request).await?;
        let method = req.method().clone();
        let url = req.url().clone();

        let response = match self.client.execute(req).await {
            Ok(response) => response,
            Err(e) => return Ok(Err(ApiError::from_transport(&e))),
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(Err(ApiError::normalize(
                    Some(status.as_u16()),
                    None,
                    Some(e.to_string()),
                )))
            }
        };

        if !status.is_success() {
            return Ok(Err(ApiError::normalize(
                Some(status.as_u16()),
                parse_body(&body),
                Some(status_message(status)),
            )));
        }

        let response = ApiResponse::new(status, headers, body);
        if self.config.dev_mode {
            debug!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %response.text(),
                "API response"
            );
        }
        Ok(Ok(response))
    }

    /// Build the transport request and attach the stored access token
    async fn intercept_request(&self, request: &RequestDescriptor) -> Result<Request> {
        let url = Url::parse(&self.build_url(&request.url))?;

        let mut headers = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(&request.headers) {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::invalid_header(key.as_str(), e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_header(key.as_str(), e.to_string()))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let mut req = builder.build().map_err(Error::Request)?;

        if let Some(token) = self.credentials.access_token().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::invalid_header(AUTHORIZATION.as_str(), e.to_string()))?;
            req.headers_mut().insert(AUTHORIZATION, value);
        }

        if self.config.dev_mode {
            debug!(
                method = %request.method,
                url = %req.url(),
                body = ?request.body,
                "API request"
            );
        }

        Ok(req)
    }

    /// Final step for every failed exchange
    fn reject(&self, request: &RequestDescriptor, err: ApiError) -> Error {
        if self.config.dev_mode {
            debug!(
                method = %request.method,
                url = %request.url,
                message = %err.message,
                "API error"
            );
        }
        Error::Api(err)
    }

    /// Clear every stored credential and send the user to the login page
    async fn sign_out(&self, cause: &ApiError) {
        warn!(
            status = ?cause.status,
            message = %cause.message,
            "Token refresh failed, signing out"
        );
        if let Err(e) = self.credentials.clear_all().await {
            error!("Failed to clear stored credentials: {e}");
        }
        self.navigator.navigate(&self.config.login_path);
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("refresh_url", &self.refresher.url())
            .finish_non_exhaustive()
    }
}
