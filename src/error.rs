//! # Error Handling
//!
//! This module defines the centralized error type for `codetriage`. It uses
//! `thiserror` to build a single `Error` enum covering every failure the
//! library can report, each variant carrying enough context to produce a
//! useful message on its own.
//!
//! The variants fall into a few groups:
//!
//! - **Schema and record violations** (`TypeMismatch`, `UnknownKey`,
//!   `InvalidSchema`): programming-level defects, surfaced immediately.
//! - **Triage file errors** (`DestinationExists`, `DestinationUnwritable`,
//!   `SourceMissing`, `Coercion`): the first three end a run, a coercion error
//!   only affects the offending cell.
//! - **Git errors** (`RefNotFound`, `GitClone`, `GitCommand`): `RefNotFound`
//!   drives the branch-to-tag fallback, the others skip one repository.
//! - **Provider errors** (`Provider`, `Authentication`, `Network`).
//! - **Configuration errors** (`ConfigParse`).
//! - **Wrapped library errors** (I/O, CSV, URL, HTTP).

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ValueType;

/// Main error type for codetriage operations
#[derive(Error, Debug)]
pub enum Error {
    /// A record field was written with a value of the wrong type.
    #[error("Type mismatch for '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        actual: ValueType,
    },

    /// A record field was addressed with a key its schema does not declare.
    #[error("Unknown column key: {key}")]
    UnknownKey { key: String },

    /// A column descriptor table violates the schema invariants.
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    /// The output file exists and overwriting it was not confirmed.
    #[error("File {} already exists", path.display())]
    DestinationExists { path: PathBuf },

    /// The output file could not be opened for writing.
    #[error("Permission denied to write to file: {} - is it open?", path.display())]
    DestinationUnwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The triage file to read does not exist.
    #[error("File {} does not exist", path.display())]
    SourceMissing { path: PathBuf },

    /// A single cell could not be converted to its column type.
    #[error("Error converting value '{value}' to {expected} for '{label}': {message}")]
    Coercion {
        label: String,
        value: String,
        expected: ValueType,
        message: String,
    },

    /// The requested branch (or tag) does not exist in the remote repository.
    #[error("No branch or tag '{r#ref}' found for {url}")]
    RefNotFound { url: String, r#ref: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, ref (branch/tag), error message, and an
    /// optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command inside a working copy.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// The hosting provider returned an unusable response.
    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    /// Credentials were missing or rejected.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// An error occurred during a network operation.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV reading or writing error, wrapped from `csv::Error`.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// An HTTP transport error, wrapped from `reqwest::Error`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
