//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use codetriage::config;
use codetriage::output::OutputConfig;

use crate::commands::{self, Context};

/// codetriage - Catalogue an owner's repositories and pull the ones you mark
#[derive(Parser, Debug)]
#[command(name = "codetriage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Read settings from this file instead of the default locations
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List an owner's repositories into a triage file
    Triage(commands::triage::TriageArgs),

    /// Clone the repositories marked in a triage file
    Pull(commands::pull::PullArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Triage(args) => {
                commands::triage::execute(args, &context(self.config.as_deref(), &self.color)?)
            }
            Commands::Pull(args) => {
                commands::pull::execute(args, &context(self.config.as_deref(), &self.color)?)
            }
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn context(config_file: Option<&Path>, color: &str) -> Result<Context> {
    let working_dir = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(Context {
        settings: config::load(config_file, &working_dir)?,
        output: OutputConfig::from_env_and_flag(color),
    })
}

/// Logs go to stderr so they never mix with command output.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialisation is harmless; keep the first logger.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
