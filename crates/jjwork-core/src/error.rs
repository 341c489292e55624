use thiserror::Error;

#[derive(Debug, Error)]
pub enum JjworkError {
    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("invalid workspace name '{0}': must be alphanumeric with '.', '_' or '-'")]
    InvalidWorkspaceName(String),

    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("repository root '{0}' has no parent directory")]
    RootHasNoParent(String),

    #[error("missing required hook input field '{0}'")]
    MissingHookField(&'static str),

    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JjworkError>;
