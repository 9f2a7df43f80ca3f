//! Default values for codetriage configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

use crate::config::OnExists;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "codetriage.toml";

pub fn default_triage_file() -> PathBuf {
    PathBuf::from("triage.csv")
}

pub fn default_destination() -> PathBuf {
    PathBuf::from("repos")
}

pub fn default_on_exists() -> OnExists {
    OnExists::Prompt
}

pub fn default_api_url() -> &'static str {
    crate::scm::github::DEFAULT_API_URL
}

/// Returns the user-level configuration file path.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/codetriage/config.toml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/codetriage/config.toml`
/// - Windows: `{FOLDERID_RoamingAppData}\codetriage\config.toml`
///
/// Returns `None` when the platform config directory cannot be determined.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codetriage").join("config.toml"))
}
