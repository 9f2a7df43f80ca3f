//! # Pull Command Implementation
//!
//! Reads a triage file and clones every repository marked `Y`/`yes` into the
//! destination directory, at the branch or tag named in "Pull Branch/Tag",
//! at every branch for `*`, or at the recorded default branch when blank.
//!
//! Problems with one repository never stop the run: each row ends up as a
//! line of output saying what was checked out or why it was skipped, and the
//! command exits successfully once every row has been handled. Only problems
//! with the run as a whole (missing triage file, no credentials) fail it.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use log::warn;

use codetriage::intent::RepositoryIntent;
use codetriage::materialize::Materializer;
use codetriage::output::{report_line, summary_line};
use codetriage::schema::Schema;
use codetriage::scm::{self, ProviderKind};
use codetriage::tabular::TabularStore;

use super::{access_token, Context};

/// Clone the repositories marked in a triage file
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Triage file to read [default: triage.csv]
    #[arg(short = 't', long, value_name = "FILE")]
    pub triage_file: Option<PathBuf>,

    /// Directory to clone into, one subdirectory per repository [default: repos]
    #[arg(short = 'd', long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Hosting provider the repositories live on
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Provider API base URL, for self-hosted servers
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Access token, or a file containing it
    #[arg(short = 'a', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

/// Execute the `pull` command.
pub fn execute(args: PullArgs, context: &Context) -> Result<()> {
    let settings = &context.settings;
    let triage_file = settings.triage_file(args.triage_file);
    let destination = settings.destination(args.destination);

    let store = TabularStore::new(Schema::triage());
    let file = store.read(&triage_file)?;

    let token = access_token(args.access_token.as_deref())?;
    let provider = scm::connect(
        settings.provider(args.provider),
        &token,
        Some(settings.api_url(args.api_url).as_str()),
    )?;

    let mut materializer = Materializer::with_operations(provider.git_operations(), &destination);
    let mut reports = Vec::new();

    for row in file
        .rows()
        .with_context(|| format!("Failed to read {}", triage_file.display()))?
    {
        let row = row.with_context(|| format!("Failed to read {}", triage_file.display()))?;
        let intent = match RepositoryIntent::from_record(&row.record) {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Line {}: {}", row.line, e);
                continue;
            }
        };

        let report = materializer.materialize(&intent);
        println!("{}", report_line(&context.output, &report));
        reports.push(report);
    }

    println!("{}", summary_line(&context.output, &reports));
    Ok(())
}
