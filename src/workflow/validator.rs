use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::audit::{ApprovalAction, ApprovalEvent, EventDetails};
use super::policy;
use super::record::VideoRecord;
use super::role::Actor;
use super::status::VideoStatus;
use crate::error::{Action, Result, WorkflowError};

/// Limits applied to the free-text comment attached to a transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRules {
    /// Rejections must explain themselves.
    pub require_rejection_comment: bool,
    /// Maximum comment length, in characters.
    pub max_comment_length: usize,
}

impl Default for CommentRules {
    fn default() -> Self {
        Self {
            require_rejection_comment: false,
            max_comment_length: 2000,
        }
    }
}

/// What a caller asks the engine to do with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Complete the current stage and move to `to`.
    Advance { to: VideoStatus, comment: Option<String> },
    /// Undo the transition that led into the current status.
    Revert { comment: Option<String> },
    /// Clear the record's assignee.
    Unassign,
}

/// An accepted status change, not yet written to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub video_id: Uuid,
    pub from: VideoStatus,
    pub to: VideoStatus,
    pub event: ApprovalEvent,
}

/// An accepted command, not yet written to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validated {
    Transition(TransitionOutcome),
    Unassign { video_id: Uuid, previous: Uuid },
}

/// Decides whether an actor may move a record, and commits accepted moves.
///
/// Validation never touches the record: a denied command leaves the status
/// and the approval history exactly as they were, so repeating it yields the
/// same error. Only the `commit_*` functions mutate.
#[derive(Debug, Clone, Default)]
pub struct TransitionValidator {
    rules: CommentRules,
}

impl TransitionValidator {
    pub fn new(rules: CommentRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CommentRules {
        &self.rules
    }

    pub fn validate(&self, actor: &Actor, record: &VideoRecord, command: &Command) -> Result<Validated> {
        match command {
            Command::Advance { to, comment } => self
                .validate_transition(actor, record, *to, comment.clone())
                .map(Validated::Transition),
            Command::Revert { comment } => self
                .validate_revert(actor, record, comment.clone())
                .map(Validated::Transition),
            Command::Unassign => self
                .validate_unassign(actor, record)
                .map(|previous| Validated::Unassign {
                    video_id: record.id,
                    previous,
                }),
        }
    }

    /// Forward move completing the current stage.
    ///
    /// The actor needs the editable view of the current status, and `to` must
    /// be a forward edge from it.
    pub fn validate_transition(
        &self,
        actor: &Actor,
        record: &VideoRecord,
        to: VideoStatus,
        comment: Option<String>,
    ) -> Result<TransitionOutcome> {
        let from = record.status();
        if !policy::can_see_details(actor.role, from) {
            return Err(deny(actor, record, Action::Transition));
        }
        let action = from
            .forward_action(to)
            .ok_or(WorkflowError::InvalidTransition { from, to })?;
        let comment = self.check_comment(action, comment)?;

        Ok(outcome(actor, record, to, action, comment))
    }

    /// Move back to the predecessor of the current status.
    pub fn validate_revert(
        &self,
        actor: &Actor,
        record: &VideoRecord,
        comment: Option<String>,
    ) -> Result<TransitionOutcome> {
        let from = record.status();
        if !policy::can_revert(actor.role, from) {
            return Err(deny(actor, record, Action::Revert));
        }
        let to = from
            .previous()
            .ok_or(WorkflowError::InvalidTransition { from, to: from })?;
        let comment = self.check_comment(ApprovalAction::Reverted, comment)?;

        Ok(outcome(actor, record, to, ApprovalAction::Reverted, comment))
    }

    /// Returns the assignee that would be cleared.
    pub fn validate_unassign(&self, actor: &Actor, record: &VideoRecord) -> Result<Uuid> {
        if !policy::can_unassign(actor.role, record.status()) {
            return Err(deny(actor, record, Action::Unassign));
        }
        record
            .assigned_to_id()
            .ok_or(WorkflowError::NotAssigned(record.id))
    }

    /// Writes an accepted status change to the record.
    ///
    /// Appends exactly one approval event and drops the secondary status
    /// label of the stage being left. Returns the outcome with the event
    /// timestamp the history actually stored.
    pub fn commit_transition(record: &mut VideoRecord, outcome: TransitionOutcome) -> TransitionOutcome {
        let stored = record.record_status_change(outcome.event).clone();
        info!(
            video_id = %record.id,
            from = %outcome.from,
            to = %outcome.to,
            action = %stored.action(),
            by = %stored.details().by,
            "status changed"
        );
        TransitionOutcome {
            event: stored,
            ..outcome
        }
    }

    /// Clears the assignee. No approval event is appended.
    pub fn commit_unassign(record: &mut VideoRecord) -> Option<Uuid> {
        let previous = record.clear_assignee();
        info!(
            video_id = %record.id,
            previous = ?previous,
            status = %record.status(),
            "assignee cleared"
        );
        previous
    }

    pub fn apply(&self, actor: &Actor, record: &mut VideoRecord, command: &Command) -> Result<Validated> {
        match self.validate(actor, record, command)? {
            Validated::Transition(outcome) => {
                Ok(Validated::Transition(Self::commit_transition(record, outcome)))
            }
            Validated::Unassign { video_id, previous } => {
                Self::commit_unassign(record);
                Ok(Validated::Unassign { video_id, previous })
            }
        }
    }

    pub fn apply_transition(
        &self,
        actor: &Actor,
        record: &mut VideoRecord,
        to: VideoStatus,
        comment: Option<String>,
    ) -> Result<TransitionOutcome> {
        let outcome = self.validate_transition(actor, record, to, comment)?;
        Ok(Self::commit_transition(record, outcome))
    }

    pub fn apply_revert(
        &self,
        actor: &Actor,
        record: &mut VideoRecord,
        comment: Option<String>,
    ) -> Result<TransitionOutcome> {
        let outcome = self.validate_revert(actor, record, comment)?;
        Ok(Self::commit_transition(record, outcome))
    }

    /// Clears the assignee and returns who it was.
    pub fn apply_unassign(&self, actor: &Actor, record: &mut VideoRecord) -> Result<Uuid> {
        let previous = self.validate_unassign(actor, record)?;
        Self::commit_unassign(record);
        Ok(previous)
    }

    fn check_comment(&self, action: ApprovalAction, comment: Option<String>) -> Result<Option<String>> {
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        match &comment {
            None if action == ApprovalAction::Rejected && self.rules.require_rejection_comment => {
                Err(WorkflowError::InvalidComment(
                    "a rejection must include a comment".into(),
                ))
            }
            Some(c) if c.chars().count() > self.rules.max_comment_length => {
                Err(WorkflowError::InvalidComment(format!(
                    "comment exceeds {} characters",
                    self.rules.max_comment_length
                )))
            }
            _ => Ok(comment),
        }
    }
}

fn deny(actor: &Actor, record: &VideoRecord, action: Action) -> WorkflowError {
    warn!(
        video_id = %record.id,
        user_id = %actor.user_id,
        role = %actor.role,
        status = %record.status(),
        %action,
        "request denied"
    );
    WorkflowError::Unauthorized {
        role: actor.role,
        action,
        status: record.status(),
    }
}

fn outcome(
    actor: &Actor,
    record: &VideoRecord,
    to: VideoStatus,
    action: ApprovalAction,
    comment: Option<String>,
) -> TransitionOutcome {
    let details = EventDetails {
        by: actor.user_id,
        role: actor.role,
        from: record.status(),
        to,
        timestamp: Utc::now(),
        comment,
    };
    TransitionOutcome {
        video_id: record.id,
        from: record.status(),
        to,
        event: ApprovalEvent::new(action, details),
    }
}
