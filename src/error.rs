//! Error types for writing-goals.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by vault access, persistence and settings handling.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("target not found in vault: {0}")]
    TargetNotFound(String),

    #[error("invalid vault path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("failed to save {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("cannot watch vault: {0}")]
    Watch(#[from] notify::Error),
}

impl GoalError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        GoalError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal problem to surface to the user, tied to the affected path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub path: String,
    pub message: String,
}

impl Notice {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to update goal for {}: {}", self.path, self.message)
    }
}

/// Result type for writing-goals operations.
pub type Result<T> = std::result::Result<T, GoalError>;
