//! Thin subprocess wrappers over the `jj` CLI.
//!
//! Mandatory operations (`workspace root`, `workspace add`) surface errors
//! with jj's stderr attached; best-effort operations swallow failures and
//! report them at debug level, so a missing binary or broken registration
//! never blocks the caller.

use crate::error::{JjworkError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct Jj {
    program: String,
}

impl Default for Jj {
    fn default() -> Self {
        Self::new()
    }
}

impl Jj {
    /// Uses `jj` from PATH, overridable via `JJWORK_JJ_BIN`.
    pub fn new() -> Jj {
        let program = std::env::var("JJWORK_JJ_BIN").unwrap_or_else(|_| "jj".to_string());
        Jj { program }
    }

    /// Use a specific jj binary.
    pub fn with_program(program: impl Into<String>) -> Jj {
        Jj {
            program: program.into(),
        }
    }

    fn command(&self, args: &[&str], cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run jj and return trimmed stdout, failing on spawn error or nonzero
    /// exit.
    fn run_checked(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let display = format!("{} {}", self.program, args.join(" "));
        let output = self
            .command(args, cwd)
            .output()
            .map_err(|e| JjworkError::Spawn {
                command: display.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(JjworkError::CommandFailed {
                command: display,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run jj and return stdout, or `None` on any failure.
    fn run_tolerant(&self, args: &[&str], cwd: &Path) -> Option<String> {
        match self.command(args, cwd).output() {
            Ok(o) if o.status.success() => Some(String::from_utf8_lossy(&o.stdout).into_owned()),
            Ok(o) => {
                tracing::debug!(
                    args = %args.join(" "),
                    stderr = %String::from_utf8_lossy(&o.stderr).trim(),
                    "jj call failed"
                );
                None
            }
            Err(e) => {
                tracing::debug!(args = %args.join(" "), error = %e, "jj spawn failed");
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Workspace operations
    // -----------------------------------------------------------------------

    /// Resolve the workspace root controlling `cwd`.
    pub fn workspace_root(&self, cwd: &Path) -> Result<PathBuf> {
        let out = self.run_checked(&["workspace", "root"], cwd)?;
        Ok(PathBuf::from(out))
    }

    /// Register a new workspace at `dest`, sharing lineage with the working
    /// copy at `cwd`.
    pub fn workspace_add(&self, cwd: &Path, name: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run_checked(&["workspace", "add", "--name", name, &*dest], cwd)?;
        Ok(())
    }

    /// Drop a workspace registration. Best-effort: returns whether jj
    /// accepted it.
    pub fn workspace_forget(&self, cwd: &Path, name: &str) -> bool {
        self.run_tolerant(&["workspace", "forget", name], cwd).is_some()
    }

    // -----------------------------------------------------------------------
    // History queries (stale-description check)
    // -----------------------------------------------------------------------

    /// Evaluate a revset with a template, one record per line. `None` on any
    /// failure (not a jj repo, revset error, jj absent).
    pub fn log(&self, cwd: &Path, revset: &str, template: &str) -> Option<String> {
        self.run_tolerant(
            &["log", "-r", revset, "--no-graph", "-T", template],
            cwd,
        )
    }

    /// Walk a change's evolution log with a template.
    pub fn evolog(&self, cwd: &Path, change: &str, template: &str) -> Option<String> {
        self.run_tolerant(
            &["evolog", "-r", change, "--no-graph", "-T", template],
            cwd,
        )
    }

    /// Render a commit's diff from its parent(s) as a git-format patch.
    /// Hidden commits are addressable by full commit id.
    pub fn diff_patch(&self, cwd: &Path, commit_id: &str) -> Option<String> {
        self.run_tolerant(
            &["diff", "-r", commit_id, "--git", "--ignore-working-copy"],
            cwd,
        )
    }
}
