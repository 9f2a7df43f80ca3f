//! # Git Primitives
//!
//! Thin wrappers over the system `git` binary. Using the installed git means
//! SSH keys, credential helpers and anything else configured in `~/.gitconfig`
//! work without codetriage knowing about them.
//!
//! Every invocation runs with `GIT_TERMINAL_PROMPT=0`, so a repository that
//! needs credentials git does not have fails instead of waiting on a prompt.
//! Extra configuration (for example an authorization header for a hosting
//! provider) is passed through `GIT_CONFIG_COUNT`/`GIT_CONFIG_KEY_n`/
//! `GIT_CONFIG_VALUE_n`, which keeps secrets off the process command line.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// A `key = value` pair of git configuration.
pub type ConfigPair = (String, String);

/// The remote name `git clone` gives the source repository.
const ORIGIN: &str = "origin";

/// A remote-tracking reference in a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    /// Branch name on the remote, e.g. `feature/login`.
    pub name: String,
    /// Full reference name, e.g. `refs/remotes/origin/feature/login`.
    pub reference: String,
    /// True for symbolic references such as `origin/HEAD`.
    pub symbolic: bool,
}

fn git(dir: Option<&Path>, config: &[ConfigPair]) -> Command {
    let mut cmd = Command::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    if !config.is_empty() {
        cmd.env("GIT_CONFIG_COUNT", config.len().to_string());
        for (index, (key, value)) in config.iter().enumerate() {
            cmd.env(format!("GIT_CONFIG_KEY_{}", index), key);
            cmd.env(format!("GIT_CONFIG_VALUE_{}", index), value);
        }
    }
    cmd
}

fn output_in(dir: &Path, config: &[ConfigPair], args: &[&str]) -> Result<Output> {
    git(Some(dir), config)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })
}

/// Run a git command in `dir` and return its trimmed stdout.
fn run_in(dir: &Path, config: &[ConfigPair], args: &[&str]) -> Result<String> {
    let output = output_in(dir, config, args)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `target_dir`.
///
/// Without a branch the working copy is left on whatever the remote's HEAD
/// names. With a branch, the branch must exist on the remote as a branch
/// (tags are not accepted here); it is then checked out as a local tracking
/// branch. A missing branch fails with `Error::RefNotFound` and leaves the
/// fresh clone in place for the caller to deal with.
pub fn clone(
    url: &str,
    target_dir: &Path,
    branch: Option<&str>,
    config: &[ConfigPair],
) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let ref_name = branch.unwrap_or("HEAD");
    let output = git(None, config)
        .args(["clone", "--quiet", "--"])
        .arg(url)
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            r#ref: ref_name.to_string(),
            message: e.to_string(),
            hint: None,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(clone_failure(url, ref_name, stderr.trim()));
    }

    let Some(branch) = branch else {
        return Ok(());
    };

    let remote_ref = format!("refs/remotes/{}/{}", ORIGIN, branch);
    if !reference_exists(target_dir, &remote_ref)? || is_symbolic(target_dir, &remote_ref)? {
        return Err(Error::RefNotFound {
            url: url.to_string(),
            r#ref: branch.to_string(),
        });
    }

    if current_branch(target_dir)?.as_deref() != Some(branch) {
        let start_point = format!("{}/{}", ORIGIN, branch);
        run_in(
            target_dir,
            &[],
            &["checkout", "--quiet", "-B", branch, "--track", &start_point],
        )?;
    }
    Ok(())
}

/// Build the error for a failed `git clone`, adding a hint for auth failures.
fn clone_failure(url: &str, ref_name: &str, stderr: &str) -> Error {
    let hint = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("could not read Username")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository. For private repositories \
             check the access token, your SSH agent or git credential helper."
                .to_string(),
        )
    } else {
        None
    };

    Error::GitClone {
        url: url.to_string(),
        r#ref: ref_name.to_string(),
        message: stderr.to_string(),
        hint,
    }
}

/// Whether a fully qualified reference exists in the working copy.
pub fn reference_exists(repo_dir: &Path, reference: &str) -> Result<bool> {
    let output = output_in(
        repo_dir,
        &[],
        &["show-ref", "--verify", "--quiet", reference],
    )?;
    Ok(output.status.success())
}

/// Whether `reference` is a symbolic ref such as `refs/remotes/origin/HEAD`.
pub fn is_symbolic(repo_dir: &Path, reference: &str) -> Result<bool> {
    let output = output_in(repo_dir, &[], &["symbolic-ref", "--quiet", reference])?;
    Ok(output.status.success())
}

/// Fetch every tag from the origin remote, replacing stale local tags.
pub fn fetch_tags(repo_dir: &Path, config: &[ConfigPair]) -> Result<()> {
    run_in(
        repo_dir,
        config,
        &["fetch", "--quiet", "--force", ORIGIN, "+refs/tags/*:refs/tags/*"],
    )?;
    Ok(())
}

/// Resolve a tag to the commit it ultimately designates.
///
/// Annotated tags and tags pointing at other tags are peeled until a commit is
/// reached. Returns `None` unless `refs/tags/<tag>` exists verbatim, so
/// revision suffixes like `v2~1` never match.
pub fn resolve_tag(repo_dir: &Path, tag: &str) -> Result<Option<String>> {
    let reference = format!("refs/tags/{}", tag);
    if !reference_exists(repo_dir, &reference)? {
        return Ok(None);
    }
    let spec = format!("{}^{{commit}}", reference);
    let output = output_in(repo_dir, &[], &["rev-parse", "--verify", "--quiet", &spec])?;
    if !output.status.success() {
        return Ok(None);
    }
    let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!commit.is_empty()).then_some(commit))
}

/// Check out `commit` without a branch.
pub fn checkout_detached(repo_dir: &Path, commit: &str) -> Result<()> {
    run_in(
        repo_dir,
        &[],
        &[
            "-c",
            "advice.detachedHead=false",
            "checkout",
            "--quiet",
            "--detach",
            commit,
        ],
    )?;
    Ok(())
}

/// List the remote-tracking references of the origin remote.
pub fn remote_branches(repo_dir: &Path) -> Result<Vec<RemoteBranch>> {
    let prefix = format!("refs/remotes/{}/", ORIGIN);
    let stdout = run_in(
        repo_dir,
        &[],
        &["for-each-ref", "--format=%(refname)%09%(symref)", &prefix],
    )?;
    Ok(parse_remote_branches(&stdout, &prefix))
}

fn parse_remote_branches(stdout: &str, prefix: &str) -> Vec<RemoteBranch> {
    stdout
        .lines()
        .filter_map(|line| {
            let (reference, symref) = line.split_once('\t').unwrap_or((line, ""));
            let name = reference.strip_prefix(prefix)?;
            Some(RemoteBranch {
                name: name.to_string(),
                reference: reference.to_string(),
                symbolic: !symref.trim().is_empty(),
            })
        })
        .collect()
}

/// List local branch names.
pub fn local_branches(repo_dir: &Path) -> Result<Vec<String>> {
    let stdout = run_in(
        repo_dir,
        &[],
        &["for-each-ref", "--format=%(refname:strip=2)", "refs/heads/"],
    )?;
    Ok(stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Create a local branch at `start_point` without checking it out.
pub fn create_branch(repo_dir: &Path, name: &str, start_point: &str) -> Result<()> {
    run_in(repo_dir, &[], &["branch", "--quiet", name, start_point])?;
    Ok(())
}

/// The checked-out branch, or `None` when HEAD is detached.
pub fn current_branch(repo_dir: &Path) -> Result<Option<String>> {
    let output = output_in(
        repo_dir,
        &[],
        &["symbolic-ref", "--quiet", "HEAD"],
    )?;
    if !output.status.success() {
        return Ok(None);
    }
    // `--short` would print `heads/x` when a tag `x` also exists.
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .trim()
        .strip_prefix("refs/heads/")
        .filter(|branch| !branch.is_empty())
        .map(str::to_string))
}

/// The commit HEAD points at.
pub fn head_commit(repo_dir: &Path) -> Result<String> {
    run_in(repo_dir, &[], &["rev-parse", "HEAD"])
}
