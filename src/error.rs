use thiserror::Error;
use uuid::Uuid;

use crate::workflow::{Role, VideoStatus};

/// Operations that go through a role/status policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    ViewDetails,
    Transition,
    Revert,
    Unassign,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::ViewDetails => write!(f, "view details of"),
            Action::Transition => write!(f, "transition"),
            Action::Revert => write!(f, "revert"),
            Action::Unassign => write!(f, "unassign"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Role {role} may not {action} a video in status {status}")]
    Unauthorized {
        role: Role,
        action: Action,
        status: VideoStatus,
    },

    #[error("No transition defined from {from} to {to}")]
    InvalidTransition {
        from: VideoStatus,
        to: VideoStatus,
    },

    #[error(
        "Video {id} changed concurrently: expected {expected} at version {expected_version}, found {actual} at version {actual_version}"
    )]
    StaleState {
        id: Uuid,
        expected: VideoStatus,
        actual: VideoStatus,
        expected_version: u64,
        actual_version: u64,
    },

    #[error("Video not found: {0}")]
    NotFound(Uuid),

    #[error("Video already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Video {0} has no assignee")]
    NotAssigned(Uuid),

    #[error("Invalid comment: {0}")]
    InvalidComment(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown video status: {0}")]
    UnknownStatus(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl WorkflowError {
    /// Only a lost compare-and-swap race is worth re-fetching and trying again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::StaleState { .. })
    }

    /// HTTP status a request handler should answer with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            WorkflowError::Unauthorized { .. } => 403,
            WorkflowError::NotFound(_) => 404,
            WorkflowError::StaleState { .. }
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::AlreadyExists(_) => 409,
            WorkflowError::NotAssigned(_)
            | WorkflowError::InvalidComment(_)
            | WorkflowError::UnknownRole(_)
            | WorkflowError::UnknownStatus(_) => 422,
            WorkflowError::Config(_)
            | WorkflowError::Io(_)
            | WorkflowError::Json(_)
            | WorkflowError::Toml(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
