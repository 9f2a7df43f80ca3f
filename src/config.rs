//! # Configuration File
//!
//! Settings that would otherwise be repeated on every invocation can live in
//! a TOML file:
//!
//! ```toml
//! output_file = "triage.csv"
//! triage_file = "triage.csv"
//! destination = "repos"
//! on_exists = "prompt"    # abort | overwrite | prompt
//! provider = "github"
//! api_url = "https://api.github.com"
//! ```
//!
//! The file is looked up in this order, and only the first one found is used:
//!
//! 1.  The path given with `--config`.
//! 2.  `codetriage.toml` in the current directory.
//! 3.  `codetriage/config.toml` in the platform config directory.
//!
//! Every key is optional. A command-line flag always wins over the file,
//! and the file wins over the built-in defaults in [`crate::defaults`].

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use serde::Deserialize;

use crate::defaults;
use crate::error::{Error, Result};
use crate::scm::ProviderKind;

const KNOWN_KEYS: &str = "output_file, triage_file, destination, on_exists, provider, api_url";

/// What `triage` does when its output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnExists {
    /// Stop without writing.
    Abort,
    /// Replace the file.
    Overwrite,
    /// Ask on the terminal.
    Prompt,
}

/// Values read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub output_file: Option<PathBuf>,
    pub triage_file: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub on_exists: Option<OnExists>,
    pub provider: Option<ProviderKind>,
    pub api_url: Option<String>,
}

impl Settings {
    pub fn output_file(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.output_file.clone())
            .unwrap_or_else(defaults::default_triage_file)
    }

    pub fn triage_file(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.triage_file.clone())
            .unwrap_or_else(defaults::default_triage_file)
    }

    pub fn destination(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.destination.clone())
            .unwrap_or_else(defaults::default_destination)
    }

    pub fn on_exists(&self, flag: Option<OnExists>) -> OnExists {
        flag.or(self.on_exists)
            .unwrap_or_else(defaults::default_on_exists)
    }

    pub fn provider(&self, flag: Option<ProviderKind>) -> ProviderKind {
        flag.or(self.provider).unwrap_or_default()
    }

    pub fn api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| defaults::default_api_url().to_string())
    }
}

/// Parse configuration file contents.
pub fn parse(content: &str) -> Result<Settings> {
    toml::from_str(content).map_err(|e| Error::ConfigParse {
        message: e.message().to_string(),
        hint: Some(format!("valid keys are: {}", KNOWN_KEYS)),
    })
}

pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content).map_err(|e| match e {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{}: {}", path.display(), message),
            hint,
        },
        other => other,
    })
}

/// Load settings from the first configuration file found.
///
/// An explicit path must exist; the implicit locations are optional.
pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Settings> {
    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path.display());
        return from_file(path);
    }

    let candidates = std::iter::once(working_dir.join(defaults::LOCAL_CONFIG_FILE))
        .chain(defaults::user_config_file());
    for candidate in candidates {
        if candidate.is_file() {
            debug!("Loading configuration from {}", candidate.display());
            return from_file(&candidate);
        }
    }

    Ok(Settings::default())
}
