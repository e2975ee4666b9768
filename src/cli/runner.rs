//! CLI runner - executes commands

use crate::auth::Navigator;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{ApiClient, ApiResponse, RequestDescriptor};
use crate::storage::{
    CredentialPair, CredentialStore, FileStore, KeyValueStore, MemoryStore, Scope,
    ScopedCredentials,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Tells the terminal user to sign in again
#[derive(Debug, Clone, Copy, Default)]
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, target: &str) {
        eprintln!("Session expired. Sign in again with `admin-api login` ({target}).");
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Login {
                token,
                refresh_token,
                user_json,
                session,
            } => {
                self.login(token, refresh_token, user_json.as_deref(), *session)
                    .await
            }
            Commands::Logout => self.logout().await,
            Commands::Status => self.status().await,
            Commands::Request {
                method,
                path,
                data,
                headers,
                query,
            } => {
                self.request(method, path, data.as_deref(), headers, query)
                    .await
            }
        }
    }

    /// Load client config: file (or defaults), then environment, then flags
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        if self.cli.verbose {
            config.dev_mode = true;
        }
        Ok(config)
    }

    /// Open both credential scopes
    fn open_credentials(&self) -> Result<ScopedCredentials> {
        let session: Arc<dyn KeyValueStore> = match &self.cli.session_file {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let persistent: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&self.cli.credentials)?);
        Ok(ScopedCredentials::new(session, persistent))
    }

    async fn login(
        &self,
        token: &str,
        refresh_token: &str,
        user_json: Option<&str>,
        session: bool,
    ) -> Result<()> {
        let scope = if session {
            if self.cli.session_file.is_none() {
                return Err(Error::config(
                    "--session needs --session-file, the in-memory session scope ends with this process",
                ));
            }
            Scope::Session
        } else {
            Scope::Persistent
        };

        let user = user_json
            .map(serde_json::from_str::<Value>)
            .transpose()?;

        let credentials = self.open_credentials()?;
        credentials
            .store_login(scope, &CredentialPair::new(token, refresh_token), user.as_ref())
            .await?;

        info!(%scope, "Stored credentials");
        self.output(&json!({ "stored": true, "scope": scope }));
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        let credentials = self.open_credentials()?;
        credentials.clear_all().await?;
        self.output(&json!({ "cleared": true }));
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        let config = self.load_config()?;
        let credentials = self.open_credentials()?;

        let scope = credentials.active_scope().await;
        let has_access_token = credentials.access_token().await.is_some();
        let has_refresh_token = credentials.refresh_token().await.is_some();
        let user = credentials.user().await;

        let client = ApiClient::new(config, credentials, TerminalNavigator)?;
        self.output(&json!({
            "base_url": client.config().base_url,
            "refresh_url": client.refresh_url(),
            "scope": scope,
            "has_access_token": has_access_token,
            "has_refresh_token": has_refresh_token,
            "user": user,
        }));
        Ok(())
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        data: Option<&str>,
        headers: &[String],
        query: &[String],
    ) -> Result<()> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::config(format!("Invalid HTTP method '{method}': {e}")))?;

        let mut request = RequestDescriptor::new(method, path);
        for raw in headers {
            let (name, value) = parse_header(raw)?;
            request = request.header(name, value);
        }
        for raw in query {
            let (key, value) = parse_query(raw)?;
            request = request.query(key, value);
        }
        if let Some(data) = data {
            request = request.json(serde_json::from_str(data)?);
        }

        let client = ApiClient::new(self.load_config()?, self.open_credentials()?, TerminalNavigator)?;
        match client.execute(request).await {
            Ok(response) => {
                self.output(&response_body(&response));
                Ok(())
            }
            Err(e) => {
                if let Some(api_error) = e.api_error() {
                    self.output(&json!({ "error": api_error }));
                }
                Err(e)
            }
        }
    }

    fn output(&self, value: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

/// Body of a response as JSON, falling back to text
fn response_body(response: &ApiResponse) -> Value {
    response.data().unwrap_or(Value::Null)
}

/// Parse `Name: value`
fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::config(format!("Header '{raw}' must look like 'Name: value'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::config(format!("Header '{raw}' has no name")));
    }
    Ok((name, value.trim()))
}

/// Parse `key=value`
fn parse_query(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| Error::config(format!("Query parameter '{raw}' must look like 'key=value'")))
}
