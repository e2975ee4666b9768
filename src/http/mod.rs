//! HTTP client module
//!
//! Every request from the application goes through [`ApiClient`], which
//! runs it through a fixed pipeline:
//!
//! 1. **Request interceptor** - attaches `Authorization: Bearer <token>` from
//!    stored credentials and, in development mode, logs the request
//! 2. **Transport** - a shared `reqwest::Client` with a 45 second timeout
//! 3. **Response interceptor** - on a first `401`, refreshes the access token
//!    once and replays the request; every other failure is normalized into
//!    an [`ApiError`](crate::error::ApiError)

mod client;
mod request;
mod response;

pub use client::ApiClient;
pub use request::RequestDescriptor;
pub use response::{parse_body, status_message, ApiResponse};
