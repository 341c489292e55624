use crate::error::{JjworkError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Settings location
// ---------------------------------------------------------------------------

pub const CLAUDE_DIR: &str = ".claude";
pub const SETTINGS_FILE: &str = "settings.json";

/// Resolve the settings file path: an explicit override wins, otherwise
/// `~/.claude/settings.json`.
pub fn settings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }
    let h = home::home_dir().ok_or(JjworkError::HomeNotFound)?;
    Ok(h.join(CLAUDE_DIR).join(SETTINGS_FILE))
}

// ---------------------------------------------------------------------------
// Workspace destinations
// ---------------------------------------------------------------------------

/// Derive the destination directory for a named workspace.
///
/// Secondary workspaces live in a sibling directory of the repository root
/// (`<parent>/<root-name>-workspaces/<name>`) so the primary working copy
/// never snapshots them.
pub fn workspace_dest(repo_root: &Path, name: &str) -> Result<PathBuf> {
    validate_workspace_name(name)?;
    let root_name = repo_root
        .file_name()
        .ok_or_else(|| JjworkError::RootHasNoParent(repo_root.display().to_string()))?
        .to_string_lossy();
    let parent = repo_root
        .parent()
        .ok_or_else(|| JjworkError::RootHasNoParent(repo_root.display().to_string()))?;
    Ok(parent.join(format!("{root_name}-workspaces")).join(name))
}

// ---------------------------------------------------------------------------
// Workspace name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap())
}

/// Reject names that could escape the workspaces directory or confuse jj.
pub fn validate_workspace_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 128 || name.contains("..") || !name_re().is_match(name) {
        return Err(JjworkError::InvalidWorkspaceName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
