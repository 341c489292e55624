//! Workspace lifecycle: create and remove isolated jj workspaces for
//! parallel agent sessions.
//!
//! State lives entirely in the filesystem and in jj's own workspace store;
//! nothing persists between invocations. Stale-state cleanup is best-effort,
//! registration and deletion are mandatory.

use crate::error::{JjworkError, Result};
use crate::jj::Jj;
use crate::paths;
use std::path::{Path, PathBuf};

/// Create (or recreate) the workspace `name`, resolving the repository root
/// from `cwd`. Returns the destination directory.
///
/// Any stale registration or directory left at the destination by an earlier
/// session is discarded first, so exactly one directory exists there
/// afterwards.
pub fn create(jj: &Jj, name: &str, cwd: &Path) -> Result<PathBuf> {
    paths::validate_workspace_name(name)?;
    let root = jj.workspace_root(cwd)?;
    let dest = paths::workspace_dest(&root, name)?;

    // Discard stale state, best-effort.
    if !jj.workspace_forget(cwd, name) {
        tracing::debug!(name, "no prior registration to forget");
    }
    if dest.exists() {
        if let Err(e) = std::fs::remove_dir_all(&dest) {
            tracing::debug!(dest = %dest.display(), error = %e, "stale directory removal failed");
        }
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    jj.workspace_add(cwd, name, &dest)?;
    Ok(dest)
}

/// Tear down the workspace at `path`: best-effort unregister the workspace
/// named after the final path segment from within that directory, then
/// delete the tree.
///
/// Unregistration failure (jj absent, registration already gone, broken
/// workspace) never fails the caller; a missing directory is fine too.
pub fn remove(jj: &Jj, path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| JjworkError::WorkspaceNotFound(path.display().to_string()))?;

    if path.is_dir() && !jj.workspace_forget(path, &name) {
        tracing::debug!(%name, "workspace forget failed, deleting anyway");
    }

    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Resolve the directory of an existing workspace `name` relative to `cwd`.
pub fn dir_of(jj: &Jj, name: &str, cwd: &Path) -> Result<PathBuf> {
    let root = jj.workspace_root(cwd)?;
    let dest = paths::workspace_dest(&root, name)?;
    if !dest.is_dir() {
        return Err(JjworkError::WorkspaceNotFound(name.to_string()));
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // A Jj pointing at a program that cannot spawn, so every jj call fails.
    fn broken_jj() -> Jj {
        Jj::with_program("/nonexistent/jj-for-tests")
    }

    #[test]
    fn remove_deletes_tree_even_without_registration() {
        let dir = TempDir::new().unwrap();
        let ws = dir.path().join("alpha");
        std::fs::create_dir_all(ws.join("sub")).unwrap();
        std::fs::write(ws.join("sub/file.txt"), "x").unwrap();

        remove(&broken_jj(), &ws).unwrap();
        assert!(!ws.exists());
    }

    #[test]
    fn remove_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        remove(&broken_jj(), &dir.path().join("gone")).unwrap();
    }

    #[test]
    fn create_rejects_invalid_name() {
        let dir = TempDir::new().unwrap();
        let err = create(&broken_jj(), "../escape", dir.path()).unwrap_err();
        assert!(matches!(err, JjworkError::InvalidWorkspaceName(_)));
    }

    #[test]
    fn create_fails_outside_a_repo() {
        let dir = TempDir::new().unwrap();
        assert!(create(&broken_jj(), "alpha", dir.path()).is_err());
    }
}
