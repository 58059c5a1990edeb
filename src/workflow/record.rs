use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audit::{ApprovalAction, ApprovalEvent, ApprovalHistory};
use super::status::{Stage, VideoStatus};

/// Output of the optimization stage: the reworked title, description and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationDetails {
    pub optimized_title: String,
    #[serde(default)]
    pub optimized_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub optimized_by: Uuid,
    pub optimized_at: DateTime<Utc>,
}

/// Free-form label attached to the current stage ("waiting on thumbnail").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryStatus {
    pub label: String,
    pub stage: Stage,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(default)]
    pub optimization: Option<OptimizationDetails>,
    #[serde(default)]
    pub secondary_status: Option<SecondaryStatus>,
    #[serde(default)]
    approval_history: ApprovalHistory,
}

/// A video moving through the production pipeline.
///
/// Status, assignee and approval history are read-only from outside the
/// workflow module; they change only through
/// [`TransitionValidator`](super::TransitionValidator) commits, each of which
/// bumps `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    status: VideoStatus,
    assigned_to_id: Option<Uuid>,
    #[serde(default)]
    version: u64,
    pub metadata: VideoMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(project_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title,
            status: VideoStatus::Pending,
            assigned_to_id: None,
            version: 0,
            metadata: VideoMetadata::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Hands a new record to its first assignee.
    pub fn with_assignee(mut self, user_id: Uuid) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_status(mut self, status: VideoStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> VideoStatus {
        self.status
    }

    pub fn assigned_to_id(&self) -> Option<Uuid> {
        self.assigned_to_id
    }

    /// Number of commits applied to this record.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to_id.is_some()
    }

    pub fn history(&self) -> &ApprovalHistory {
        &self.metadata.approval_history
    }

    pub fn set_optimization(&mut self, details: OptimizationDetails) {
        self.metadata.optimization = Some(details);
        self.updated_at = Utc::now();
    }

    /// Tags the current stage with a label. The label is dropped on the next
    /// status change, since it describes the stage it was set in.
    pub fn set_secondary_status(&mut self, label: String, by: Uuid) {
        let now = Utc::now();
        self.metadata.secondary_status = Some(SecondaryStatus {
            label,
            stage: self.status.stage(),
            updated_by: by,
            updated_at: now,
        });
        self.updated_at = now;
    }

    /// Moves to the event's target status and appends the event.
    pub(super) fn record_status_change(&mut self, event: ApprovalEvent) -> &ApprovalEvent {
        self.status = event.details().to;
        self.metadata.secondary_status = None;
        self.version += 1;
        let stored = self.metadata.approval_history.append(event);
        self.updated_at = stored.details().timestamp;
        stored
    }

    pub(super) fn clear_assignee(&mut self) -> Option<Uuid> {
        self.version += 1;
        self.updated_at = Utc::now();
        self.assigned_to_id.take()
    }
}

/// Summary of where a record stands, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub video_id: Uuid,
    pub title: String,
    pub status: VideoStatus,
    pub stage: Stage,
    pub revert_path: Vec<VideoStatus>,
    pub next_statuses: Vec<VideoStatus>,
    pub approvals: usize,
    pub rejections: usize,
    pub reverts: usize,
    pub assigned_to_id: Option<Uuid>,
    pub last_changed_at: DateTime<Utc>,
}

impl ProgressReport {
    pub fn from_record(record: &VideoRecord) -> Self {
        let count = |action: ApprovalAction| {
            record
                .history()
                .iter()
                .filter(|event| event.action() == action)
                .count()
        };

        Self {
            video_id: record.id,
            title: record.title.clone(),
            status: record.status,
            stage: record.status.stage(),
            revert_path: record.status.revert_path(),
            next_statuses: record.status.next_statuses(),
            approvals: count(ApprovalAction::Approved),
            rejections: count(ApprovalAction::Rejected),
            reverts: count(ApprovalAction::Reverted),
            assigned_to_id: record.assigned_to_id,
            last_changed_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{EventDetails, Role};

    #[test]
    fn record_creation_defaults() {
        let record = VideoRecord::new(Uuid::new_v4(), "Launch trailer".into());
        assert_eq!(record.status(), VideoStatus::Pending);
        assert_eq!(record.version(), 0);
        assert!(!record.is_assigned());
        assert!(record.history().is_empty());
        assert!(record.metadata.optimization.is_none());
    }

    #[test]
    fn secondary_status_tracks_current_stage() {
        let mut record =
            VideoRecord::new(Uuid::new_v4(), "Tutorial".into()).with_status(VideoStatus::UploadMedia);
        let editor = Uuid::new_v4();
        record.set_secondary_status("waiting on thumbnail".into(), editor);

        let secondary = record.metadata.secondary_status.as_ref().unwrap();
        assert_eq!(secondary.stage, Stage::Media);
        assert_eq!(secondary.updated_by, editor);
    }

    #[test]
    fn record_serializes_camel_case() {
        let mut record = VideoRecord::new(Uuid::new_v4(), "Serialize me".into());
        record.set_optimization(OptimizationDetails {
            optimized_title: "Serialize Me (2026)".into(),
            optimized_description: None,
            tags: vec!["rust".into()],
            optimized_by: Uuid::new_v4(),
            optimized_at: Utc::now(),
        });
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("projectId").is_some());
        assert!(value.get("assignedToId").is_some());
        assert!(value["metadata"]["approvalHistory"].is_array());
        assert_eq!(
            value["metadata"]["optimization"]["optimizedTitle"],
            "Serialize Me (2026)"
        );

        let back: VideoRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn status_change_appends_and_bumps_version() {
        let mut record =
            VideoRecord::new(Uuid::new_v4(), "Teaser".into()).with_assignee(Uuid::new_v4());
        let details = EventDetails {
            by: Uuid::new_v4(),
            role: Role::Admin,
            from: VideoStatus::Pending,
            to: VideoStatus::InProgress,
            timestamp: Utc::now(),
            comment: None,
        };
        record.record_status_change(ApprovalEvent::new(ApprovalAction::Approved, details));
        assert_eq!(record.status(), VideoStatus::InProgress);
        assert_eq!(record.version(), 1);
        assert_eq!(record.history().len(), 1);

        assert!(record.clear_assignee().is_some());
        assert_eq!(record.version(), 2);
        assert_eq!(record.history().len(), 1);
    }

    #[test]
    fn version_defaults_when_absent_from_json() {
        let record = VideoRecord::new(Uuid::new_v4(), "Legacy".into());
        let mut value = serde_json::to_value(&record).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let back: VideoRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.version(), 0);
    }

    #[test]
    fn progress_report_from_fresh_record() {
        let record = VideoRecord::new(Uuid::new_v4(), "Short".into());
        let report = ProgressReport::from_record(&record);
        assert_eq!(report.stage, Stage::Optimization);
        assert_eq!(report.revert_path, vec![VideoStatus::Pending]);
        assert_eq!(report.next_statuses, vec![VideoStatus::InProgress]);
        assert_eq!(report.approvals + report.rejections + report.reverts, 0);
    }
}
