//! # Output Configuration
//!
//! This module provides utilities for controlling CLI output appearance,
//! including color support based on terminal capabilities and user
//! preferences, and the per-repository lines `pull` prints.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use codetriage::output::{report_line, OutputConfig};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! for report in &reports {
//!     println!("{}", report_line(&config, report));
//! }
//! ```

use std::env;

use console::style;

use crate::materialize::{Outcome, Report, SkipReason};

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// # Behavior
    /// - `--color=always`: Force colors on (overrides NO_COLOR)
    /// - `--color=never`: Force colors off
    /// - `--color=auto`: Detect based on environment
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

enum Tone {
    Good,
    Warn,
    Quiet,
}

fn paint(config: &OutputConfig, text: &str, tone: Tone) -> String {
    if !config.use_color {
        return text.to_string();
    }
    let styled = style(text).force_styling(true);
    match tone {
        Tone::Good => styled.green().to_string(),
        Tone::Warn => styled.yellow().to_string(),
        Tone::Quiet => styled.dim().to_string(),
    }
}

/// One line describing what happened to a repository during `pull`.
pub fn report_line(config: &OutputConfig, report: &Report) -> String {
    match &report.outcome {
        Outcome::Materialized(checkout) => format!(
            "{} {} -> {} ({})",
            paint(config, "pulled ", Tone::Good),
            report.name,
            report.destination.display(),
            checkout
        ),
        Outcome::Skipped(reason @ SkipReason::NotRequested) => format!(
            "{} {}: {}",
            paint(config, "skipped", Tone::Quiet),
            report.name,
            reason
        ),
        Outcome::Skipped(reason) => format!(
            "{} {}: {}",
            paint(config, "skipped", Tone::Warn),
            report.name,
            reason
        ),
    }
}

/// Totals printed after a pull.
pub fn summary_line(config: &OutputConfig, reports: &[Report]) -> String {
    let pulled = reports.iter().filter(|r| r.is_materialized()).count();
    let not_requested = reports
        .iter()
        .filter(|r| r.outcome == Outcome::Skipped(SkipReason::NotRequested))
        .count();
    let problems = reports.len() - pulled - not_requested;

    let problem_text = format!("{} skipped", problems);
    let problem_text = if problems > 0 {
        paint(config, &problem_text, Tone::Warn)
    } else {
        problem_text
    };

    format!(
        "{} pulled, {} not requested, {}",
        pulled, not_requested, problem_text
    )
}
