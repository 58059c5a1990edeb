use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;

/// Collaborator roles. `Reviewer` spans several review stages that the
/// single-stage reviewer roles own individually; both sets coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Optimizer,
    ContentReviewer,
    MediaReviewer,
    Reviewer,
    Youtuber,
    Uploader,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Optimizer,
        Role::ContentReviewer,
        Role::MediaReviewer,
        Role::Reviewer,
        Role::Youtuber,
        Role::Uploader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Optimizer => "optimizer",
            Role::ContentReviewer => "content_reviewer",
            Role::MediaReviewer => "media_reviewer",
            Role::Reviewer => "reviewer",
            Role::Youtuber => "youtuber",
            Role::Uploader => "uploader",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .find(|role| role.as_str() == s)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownRole(s.to_string()))
    }
}

/// An authenticated user acting on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}
