//! Credential storage module
//!
//! Credentials live in one of two scopes:
//!
//! - **Session** - gone when the process (or browser session) ends
//! - **Persistent** - survives restarts
//!
//! Which scope is used is decided at login time. The pipeline only ever talks
//! to the [`CredentialStore`] capability, so tests can swap the backends for
//! in-memory maps.

mod credentials;
mod store;

pub use credentials::{
    CredentialPair, CredentialStore, Scope, ScopedCredentials, REFRESH_TOKEN_KEY, TOKEN_KEY,
    USER_KEY,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};

#[cfg(test)]
mod tests;
