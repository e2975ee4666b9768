//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Admin API client CLI
#[derive(Parser, Debug)]
#[command(name = "admin-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Persistent credential file (JSON)
    #[arg(long, global = true, default_value = ".admin-api/credentials.json")]
    pub credentials: PathBuf,

    /// Session credential file (JSON); without it the session scope lives in memory
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output (turns on development-mode request logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a credential pair issued by the login flow
    Login {
        /// Access token
        #[arg(long)]
        token: String,

        /// Refresh token
        #[arg(long)]
        refresh_token: String,

        /// Cached user profile (JSON)
        #[arg(long)]
        user_json: Option<String>,

        /// Keep credentials in the session scope instead of the persistent one
        #[arg(long)]
        session: bool,
    },

    /// Clear stored credentials from both scopes
    Logout,

    /// Show which scope holds credentials
    Status,

    /// Send a request through the authenticated pipeline
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
        method: String,

        /// Path relative to the base URL, or an absolute URL
        path: String,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,

        /// Extra header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Query parameter as `key=value` (repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
