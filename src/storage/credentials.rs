//! Scoped credential storage
//!
//! At most one scope holds a live credential pair at a time. Reads check the
//! session scope before the persistent one; writes go back to whichever scope
//! the refresh token was found in.

use super::store::{KeyValueStore, MemoryStore};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Storage key for the access token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key for the cached user profile
pub const USER_KEY: &str = "user";

/// Storage lifetime of a credential pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Cleared when the session ends
    Session,
    /// Survives restarts
    Persistent,
}

impl Scope {
    /// Lookup order used for every read
    pub const READ_ORDER: [Scope; 2] = [Scope::Session, Scope::Persistent];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Session => f.write_str("session"),
            Scope::Persistent => f.write_str("persistent"),
        }
    }
}

/// Access and refresh token issued at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// What the pipeline needs from credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current access token, session scope first
    async fn access_token(&self) -> Option<String>;

    /// Current refresh token and the scope holding it, session scope first
    async fn refresh_token(&self) -> Option<(Scope, String)>;

    /// Replace the access token in one scope only
    async fn set_access_token(&self, scope: Scope, token: &str) -> Result<()>;

    /// Remove tokens and the cached user from both scopes
    async fn clear_all(&self) -> Result<()>;
}

/// Credential store over a session-scoped and a persistent key-value store
#[derive(Debug, Clone)]
pub struct ScopedCredentials {
    session: Arc<dyn KeyValueStore>,
    persistent: Arc<dyn KeyValueStore>,
}

impl ScopedCredentials {
    /// Create a credential store over the two scopes
    pub fn new(session: Arc<dyn KeyValueStore>, persistent: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session,
            persistent,
        }
    }

    /// Both scopes in memory (nothing survives the process)
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Backing store for a scope
    pub fn scope(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::Session => self.session.as_ref(),
            Scope::Persistent => self.persistent.as_ref(),
        }
    }

    /// Store a fresh login into one scope.
    ///
    /// The other scope is wiped first so only one scope ever holds credentials.
    pub async fn store_login(
        &self,
        scope: Scope,
        pair: &CredentialPair,
        user: Option<&Value>,
    ) -> Result<()> {
        let other = match scope {
            Scope::Session => Scope::Persistent,
            Scope::Persistent => Scope::Session,
        };
        clear_scope(self.scope(other)).await?;

        let store = self.scope(scope);
        store.set(TOKEN_KEY, &pair.access_token).await?;
        store.set(REFRESH_TOKEN_KEY, &pair.refresh_token).await?;
        match user {
            Some(user) => store.set(USER_KEY, &user.to_string()).await?,
            None => store.remove(USER_KEY).await?,
        }
        Ok(())
    }

    /// Scope currently holding credentials, if any
    pub async fn active_scope(&self) -> Option<Scope> {
        for scope in Scope::READ_ORDER {
            let store = self.scope(scope);
            if store.get(REFRESH_TOKEN_KEY).await.is_some() || store.get(TOKEN_KEY).await.is_some()
            {
                return Some(scope);
            }
        }
        None
    }

    /// Cached user profile, if one was stored at login
    pub async fn user(&self) -> Option<Value> {
        for scope in Scope::READ_ORDER {
            if let Some(raw) = self.scope(scope).get(USER_KEY).await {
                return serde_json::from_str(&raw).ok();
            }
        }
        None
    }
}

#[async_trait]
impl CredentialStore for ScopedCredentials {
    async fn access_token(&self) -> Option<String> {
        for scope in Scope::READ_ORDER {
            if let Some(token) = self.scope(scope).get(TOKEN_KEY).await {
                return Some(token);
            }
        }
        None
    }

    async fn refresh_token(&self) -> Option<(Scope, String)> {
        for scope in Scope::READ_ORDER {
            if let Some(token) = self.scope(scope).get(REFRESH_TOKEN_KEY).await {
                return Some((scope, token));
            }
        }
        None
    }

    async fn set_access_token(&self, scope: Scope, token: &str) -> Result<()> {
        self.scope(scope).set(TOKEN_KEY, token).await
    }

    async fn clear_all(&self) -> Result<()> {
        // Both scopes are always attempted; the first failure is reported.
        let session = clear_scope(self.session.as_ref()).await;
        let persistent = clear_scope(self.persistent.as_ref()).await;
        session.and(persistent)
    }
}

async fn clear_scope(store: &dyn KeyValueStore) -> Result<()> {
    let mut result = Ok(());
    for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
        if let Err(e) = store.remove(key).await {
            if result.is_ok() {
                result = Err(e);
            }
        }
    }
    result
}
