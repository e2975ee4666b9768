//! # Admin API Client
//!
//! Authenticated HTTP client for the admin platform's REST API.
//!
//! ## Features
//!
//! - **Bearer Auth**: Attaches the stored access token to every request
//! - **Silent Refresh**: Recovers once from an expired token and replays the request
//! - **Sign-out on Failure**: Clears credentials and redirects to login when refresh fails
//! - **Normalized Errors**: Every failure surfaces as `{ message, status, data }`
//! - **Scoped Storage**: Session and persistent credential scopes, never mixed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use admin_api_client::{ApiClient, ClientConfig, LogNavigator, ScopedCredentials, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ApiClient::new(
//!         ClientConfig::from_env(),
//!         ScopedCredentials::in_memory(),
//!         LogNavigator,
//!     )?;
//!
//!     let products: serde_json::Value = client.get_json("/products").await?;
//!     println!("{products}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ──► request interceptor ──► transport ──► response interceptor ──► caller
//!              (bearer token)        (reqwest)       │
//!                                                    ├─ 401, first time ─► refresh ─► replay
//!                                                    ├─ refresh failed ──► clear + /login
//!                                                    └─ other failure ───► ApiError
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and the normalized API error
pub mod error;

/// Client configuration
pub mod config;

/// Session and persistent credential storage
pub mod storage;

/// Token refresh and login navigation
pub mod auth;

/// The authenticated HTTP pipeline
pub mod http;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{LogNavigator, Navigator};
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use http::{ApiClient, ApiResponse, RequestDescriptor};
pub use storage::{CredentialPair, CredentialStore, Scope, ScopedCredentials};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
