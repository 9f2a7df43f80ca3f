//! # Triage Command Implementation
//!
//! Lists every repository an owner exposes on a provider and writes one row
//! per repository to a triage file. The operator columns (Pull (Y/N),
//! Pull Branch/Tag, Notes) are left blank for a human to fill in before
//! running `pull`.
//!
//! An existing output file is handled according to `--on-exists`:
//! `abort` stops, `overwrite` replaces it and `prompt` asks first. The
//! check runs before the provider is contacted, so a refusal costs nothing.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use log::info;

use codetriage::catalogue::catalogue;
use codetriage::config::OnExists;
use codetriage::error::Error;
use codetriage::schema::Schema;
use codetriage::scm::{self, ProviderKind};
use codetriage::tabular::TabularStore;

use super::{access_token, Context};

/// List an owner's repositories into a triage file
#[derive(Args, Debug)]
pub struct TriageArgs {
    /// User or organisation whose repositories to list
    pub owner: String,

    /// Triage file to write [default: triage.csv]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// What to do when the output file already exists [default: prompt]
    #[arg(long, value_enum, value_name = "MODE")]
    pub on_exists: Option<OnExists>,

    /// Hosting provider to list from
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Provider API base URL, for self-hosted servers
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Access token, or a file containing it
    #[arg(short = 'a', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

/// Execute the `triage` command.
pub fn execute(args: TriageArgs, context: &Context) -> Result<()> {
    let settings = &context.settings;
    let output = settings.output_file(args.output);
    let on_exists = settings.on_exists(args.on_exists);

    let overwrite = output.exists() && confirm_overwrite(&output, on_exists)?;

    let token = access_token(args.access_token.as_deref())?;
    let provider = scm::connect(
        settings.provider(args.provider),
        &token,
        Some(settings.api_url(args.api_url).as_str()),
    )?;

    let records = catalogue(provider.as_ref(), &args.owner, Schema::triage())
        .with_context(|| format!("Failed to list repositories for {}", args.owner))?;

    let store = TabularStore::new(Schema::triage());
    let written = store.write(&records, &output, overwrite)?;

    info!("Wrote {} repositories to {}", written, output.display());
    println!(
        "Wrote {} repositories for {} to {}",
        written,
        args.owner,
        output.display()
    );
    Ok(())
}

/// Decide whether an existing output file may be replaced.
///
/// Only returns `Ok(true)`; every refusal is an error so the process exits
/// non-zero.
fn confirm_overwrite(output: &Path, on_exists: OnExists) -> Result<bool> {
    let exists = || Error::DestinationExists {
        path: output.to_path_buf(),
    };

    match on_exists {
        OnExists::Overwrite => Ok(true),
        OnExists::Abort => Err(exists().into()),
        OnExists::Prompt => {
            if !console::Term::stderr().is_term() {
                bail!(
                    "{}; use --on-exists overwrite to replace it without asking",
                    exists()
                );
            }
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("File {} already exists. Overwrite?", output.display()))
                .default(false)
                .interact()
                .context("Failed to read confirmation")?;
            if !confirmed {
                info!("Exiting...");
                return Err(exists().into());
            }
            Ok(true)
        }
    }
}
