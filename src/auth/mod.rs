//! Authentication module
//!
//! Holds the two capabilities the pipeline's refresh path relies on:
//!
//! - [`TokenRefresher`] - exchanges a refresh token for a new access token
//! - [`Navigator`] - sends the application to the login page after an
//!   unrecoverable auth failure

mod navigation;
mod refresh;

pub use navigation::{LogNavigator, Navigator};
pub use refresh::{refresh_url, RefreshRequest, RefreshResponse, TokenRefresher, REFRESH_PATH};
