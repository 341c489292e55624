//! Hook handlers invoked by the host agent runtime.
//!
//! The invocation contract is a JSON object on stdin; stdout is ignored for
//! every hook except `worktree-create`, whose stdout must be exactly the
//! destination path. Exit code 0 signals success.

use anyhow::Context;
use clap::Subcommand;
use jjwork_core::jj::Jj;
use jjwork_core::stale::{self, StaleChange};
use jjwork_core::{workspace, JjworkError};
use serde::Deserialize;
use std::path::PathBuf;

/// Maximum stop-hook retries per session before giving up (prevents an agent
/// that can't fix its descriptions from looping forever).
const MAX_STOP_RETRIES: u32 = 3;

#[derive(Subcommand)]
pub enum HookSubcommand {
    /// Create an isolated jj workspace; prints its path
    WorktreeCreate,
    /// Forget and delete a jj workspace
    WorktreeRemove,
    /// Flag changes whose content drifted since their last describe
    DescribeCheck {
        /// Block (stderr + exit 2) instead of advising
        #[arg(long)]
        stop: bool,
    },
}

/// Fields the handlers read from the hook payload; everything else is
/// carried in `extra` and ignored.
#[derive(Debug, Deserialize)]
struct HookInput {
    name: Option<String>,
    cwd: Option<String>,
    path: Option<String>,
    #[serde(flatten)]
    _extra: serde_json::Map<String, serde_json::Value>,
}

fn read_input() -> anyhow::Result<HookInput> {
    serde_json::from_reader(std::io::stdin().lock()).context("failed to parse hook input")
}

pub fn run(subcommand: HookSubcommand) -> anyhow::Result<()> {
    match subcommand {
        HookSubcommand::WorktreeCreate => worktree_create(),
        HookSubcommand::WorktreeRemove => worktree_remove(),
        HookSubcommand::DescribeCheck { stop } => describe_check(stop),
    }
}

// ---------------------------------------------------------------------------
// Worktree lifecycle
// ---------------------------------------------------------------------------

fn worktree_create() -> anyhow::Result<()> {
    let input = read_input()?;
    let name = input.name.ok_or(JjworkError::MissingHookField("name"))?;
    let cwd = input
        .cwd
        .map(PathBuf::from)
        .ok_or(JjworkError::MissingHookField("cwd"))?;

    let dest = workspace::create(&Jj::new(), &name, &cwd)
        .with_context(|| format!("failed to create workspace '{name}'"))?;

    // The caller consumes stdout as the destination path verbatim.
    println!("{}", dest.display());
    Ok(())
}

fn worktree_remove() -> anyhow::Result<()> {
    let input = read_input()?;
    let path = input
        .path
        .or(input.cwd)
        .map(PathBuf::from)
        .ok_or(JjworkError::MissingHookField("path"))?;

    workspace::remove(&Jj::new(), &path)
        .with_context(|| format!("failed to remove workspace at {}", path.display()))
}

// ---------------------------------------------------------------------------
// Stale-description check
// ---------------------------------------------------------------------------

fn describe_check(stop: bool) -> anyhow::Result<()> {
    // Fail open: analysis errors must never block the agent.
    if let Err(e) = describe_check_inner(stop) {
        if std::env::var_os("JJWORK_DEBUG").is_some() {
            eprintln!("jjwork describe-check: {e:#}");
        }
    }
    Ok(())
}

fn describe_check_inner(stop: bool) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let stale = stale::find_stale(&Jj::new(), &cwd);

    if stale.is_empty() {
        // Up to date: re-arm the stop hook for later in the session.
        if stop {
            let _ = std::fs::remove_file(retry_file());
        }
        return Ok(());
    }

    let msg = format_stale_message(&stale);
    if stop {
        emit_stop(&msg)
    } else {
        emit_advisory(&msg)
    }
}

fn format_stale_message(stale: &[StaleChange]) -> String {
    use std::fmt::Write as _;

    let mut msg = String::new();
    for (i, change) in stale.iter().enumerate() {
        if i > 0 {
            msg.push('\n');
        }
        let _ = write!(
            msg,
            "Stale description: change {} modified since last described.",
            change.change_id
        );
        if !change.changed_files.is_empty() {
            let _ = write!(msg, "\n  Changed: {}", change.changed_files.join(", "));
        }
    }
    msg
}

/// Advisory mode: hook-protocol JSON on stdout, exit 0.
fn emit_advisory(msg: &str) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "hookSpecificOutput": {
            "additionalContext": msg
        }
    });
    println!("{output}");
    Ok(())
}

/// Stop mode: message on stderr, exit 2, capped per session.
fn emit_stop(msg: &str) -> anyhow::Result<()> {
    let retry_file = retry_file();
    let retries: u32 = std::fs::read_to_string(&retry_file)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);

    if retries >= MAX_STOP_RETRIES {
        return Ok(());
    }
    std::fs::write(&retry_file, (retries + 1).to_string())
        .with_context(|| format!("failed to write {}", retry_file.display()))?;

    eprintln!(
        "{msg}\n\nUpdate every stale description before stopping \
         (jj describe -r <change>)."
    );
    std::process::exit(2);
}

fn retry_file() -> PathBuf {
    let session_id =
        std::env::var("CLAUDE_SESSION_ID").unwrap_or_else(|_| "unknown".to_string());
    std::env::temp_dir().join(format!("jjwork-describe-retries-{session_id}"))
}
