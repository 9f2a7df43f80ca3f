//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `codetriage`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The `execute` function is the main entry point for the command and is
//! responsible for orchestrating the necessary operations, calling into the
//! `codetriage` library to perform the core logic.

use anyhow::{Context as _, Result};

use codetriage::config::Settings;
use codetriage::credentials;
use codetriage::output::OutputConfig;

pub mod completions;
pub mod pull;
pub mod triage;

/// State shared by the commands: merged settings and output preferences.
pub struct Context {
    pub settings: Settings,
    pub output: OutputConfig,
}

/// Resolve the token given with `--access-token` or `GITHUB_TOKEN`.
pub(crate) fn access_token(value: Option<&str>) -> Result<String> {
    credentials::resolve_token(value.unwrap_or_default())
        .context("An access token is required: pass --access-token or set GITHUB_TOKEN")
}
