//! `codetriage completions <shell>` prints a tab-completion script.
//!
//! The script covers both workflows: `triage <OWNER>` with its
//! `--on-exists` modes, and `pull` with its triage file and destination
//! paths. Install it wherever your shell looks for completions:
//!
//! ```bash
//! codetriage completions bash > ~/.local/share/bash-completion/completions/codetriage
//! codetriage completions zsh > ~/.zfunc/_codetriage
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

const BIN_NAME: &str = "codetriage";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

fn render(shell: CompletionShell, out: &mut dyn Write) {
    generate(Shell::from(shell), &mut Cli::command(), BIN_NAME, out);
}

pub fn execute(args: CompletionsArgs) -> Result<()> {
    render(args.shell, &mut io::stdout());
    Ok(())
}
