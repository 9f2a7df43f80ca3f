//! Access token handling.
//!
//! A token may be given literally or as the path of a file holding it. The
//! file form keeps tokens out of shell history and process listings.

use std::fs;
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};

/// Resolve the `--access-token` value to the token itself.
pub fn resolve_token(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Authentication {
            message: "no access token given".to_string(),
        });
    }

    let path = Path::new(value);
    let token = if path.is_file() {
        fs::read_to_string(path)?.trim().to_string()
    } else {
        warn!("Using the access token from the command line; pass a file path to keep it out of your shell history");
        value.to_string()
    };

    if token.is_empty() {
        return Err(Error::Authentication {
            message: format!("token file {} is empty", path.display()),
        });
    }
    Ok(token)
}
