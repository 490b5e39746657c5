//!
//! gh-apply pulls a single commit from GitHub into the repository you are
//! standing in. It is the quick way to cherry-pick across forks without
//! adding a remote.
//!
//! # Installation
//!
//! Simply run:
//! ```sh
//! cargo install gh-apply
//! ```
//!
//! # Usage
//!
//! Point it at a commit, in any of these shapes:
//!
//! ```sh
//! gh-apply https://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed
//! gh-apply https://github.com/user/repo/commit/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed.patch
//! gh-apply user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed
//! ```
//!
//! The patch is downloaded and handed to `git apply`, leaving the changes
//! uncommitted in the working tree.
//!
//! To commit it instead, with a `Signed-off-by` trailer:
//! ```sh
//! gh-apply user/repo/2aae6c35c94fcfb415dbe95f408b9ce91ee846ed --commit
//! ```
//!
//! gh-apply exits with git's own exit status, so conflicts show up the
//! same way they would with `git apply` or `git am`.

pub mod fetch;
pub mod git;
pub mod normalize;

use std::{ffi::OsString, time::Duration};

use anyhow::Result;
use clap::Parser;
use log::*;

pub use fetch::{HttpFetcher, PatchSource};
pub use git::{Git, PatchApplier};
pub use normalize::{InputError, PatchUrl};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Commit URL, `github.com/...` path or `owner/repo/sha` shorthand
    pub input: Option<String>,
    /// Commit the patch with a sign-off (`git am --signoff`)
    #[arg(short, long, short_alias = 'C')]
    pub commit: bool,
    /// Print progress around git's own output
    #[arg(short, long)]
    pub verbose: bool,
    /// git executable to run
    #[arg(long, env = "GH_APPLY_GIT", default_value = "git")]
    pub git: OsString,
    /// Give up the download after this many seconds
    #[arg(long, env = "GH_APPLY_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

/// `-c` or `--commit`, in any case.
fn is_commit_flag(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("-c") || arg.eq_ignore_ascii_case("--commit")
}

impl Cli {
    /// Whether to commit with a sign-off instead of only patching the working tree.
    ///
    /// Spellings clap does not know, like `--COMMIT`, still count when they
    /// directly follow the input.
    pub fn commit_mode(&self) -> bool {
        self.commit || self.rest.first().is_some_and(|arg| is_commit_flag(arg))
    }

    fn ignored_args(&self) -> &[String] {
        match self.rest.split_first() {
            Some((first, rest)) if is_commit_flag(first) => rest,
            _ => &self.rest,
        }
    }

    pub fn fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::new(self.timeout.map(Duration::from_secs))
    }

    pub fn applier(&self) -> Git {
        Git::new(&self.git)
    }
}

/// Downloads the patch named by `cli.input` and applies it.
///
/// Returns the exit status of the apply step. Nothing is fetched when the
/// input is missing or malformed, and nothing is applied when the download
/// fails.
pub fn run(cli: &Cli, source: &impl PatchSource, applier: &impl PatchApplier) -> Result<i32> {
    let input = cli.input.as_deref().ok_or(InputError::Missing)?;
    let url: PatchUrl = input.parse()?;

    if cli.verbose {
        let ignored = cli.ignored_args();
        if !ignored.is_empty() {
            warn!("ignoring extra arguments: {}", ignored.join(" "));
        }
        info!("downloading {}", url);
    }
    let patch = source.fetch(&url)?;

    let commit = format!("{}/{}@{}", url.owner(), url.repo(), &url.sha()[..7]);
    let code = if cli.commit_mode() {
        if cli.verbose {
            info!("commit: {}, applying with sign-off.", commit);
        }
        applier.apply_with_signoff(&patch)?
    } else {
        if cli.verbose {
            info!("commit: {}, applying to the working tree.", commit);
        }
        applier.apply(&patch)?
    };

    if code == 0 && cli.verbose {
        success!("commit: {}, done.", commit);
    }
    Ok(code)
}

/// Runs with the real HTTP client and git binary described by `cli`.
pub fn run_cli(cli: &Cli) -> Result<i32> {
    run(cli, &cli.fetcher()?, &cli.applier())
}

mod log {
    pub use paris::*;
}
