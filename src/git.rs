use std::{
    ffi::OsString,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Applies a downloaded patch to a checkout.
///
/// Both operations return the exit status of whatever did the work, so a
/// conflict or a malformed patch is a status, not an error.
pub trait PatchApplier {
    /// Patches the working tree without committing.
    fn apply(&self, patch: &[u8]) -> Result<i32>;
    /// Applies a mailbox patch and commits it with a `Signed-off-by` trailer.
    fn apply_with_signoff(&self, patch: &[u8]) -> Result<i32>;
}

#[derive(Debug, Clone)]
pub struct Git {
    program: OsString,
    repo_dir: Option<PathBuf>,
}

impl Git {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            repo_dir: None,
        }
    }

    /// Runs in `repo_dir` instead of the current directory.
    pub fn current_dir(mut self, repo_dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = Some(repo_dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(repo_dir) = &self.repo_dir {
            cmd.current_dir(repo_dir);
        }
        cmd
    }

    // stdout and stderr are inherited
    fn status(&self, mut cmd: Command) -> Result<i32> {
        let status = cmd
            .status()
            .with_context(|| format!("Failed to run {}", self.program.to_string_lossy()))?;
        Ok(status.code().unwrap_or(1))
    }
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

/// The file is removed when the returned handle drops.
fn write_patch_file(patch: &[u8]) -> Result<NamedTempFile> {
    let mut patch_file = tempfile::Builder::new()
        .prefix("patch")
        .tempfile()
        .context("Failed to create a temporary patch file")?;
    patch_file.write_all(patch)?;
    patch_file.flush()?;
    Ok(patch_file)
}

impl PatchApplier for Git {
    fn apply(&self, patch: &[u8]) -> Result<i32> {
        let patch_file = write_patch_file(patch)?;
        let mut cmd = self.command();
        cmd.arg("apply").arg(patch_file.path());
        self.status(cmd)
    }

    fn apply_with_signoff(&self, patch: &[u8]) -> Result<i32> {
        let patch_file = write_patch_file(patch)?;
        let mut cmd = self.command();
        cmd.args(["am", "--signoff"])
            .stdin(Stdio::from(patch_file.reopen()?));
        self.status(cmd)
    }
}
