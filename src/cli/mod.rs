//! CLI module
//!
//! Command-line interface over the API client.
//!
//! # Commands
//!
//! - `login` - Store a credential pair in the session or persistent scope
//! - `logout` - Clear every stored credential
//! - `status` - Show which scope holds credentials
//! - `request` - Send a request through the authenticated pipeline

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
