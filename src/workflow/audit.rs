use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;
use super::status::VideoStatus;

/// What an accepted transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approved,
    Rejected,
    Reverted,
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalAction::Approved => write!(f, "approved"),
            ApprovalAction::Rejected => write!(f, "rejected"),
            ApprovalAction::Reverted => write!(f, "reverted"),
        }
    }
}

/// Who moved the record, from where to where, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub by: Uuid,
    pub role: Role,
    pub from: VideoStatus,
    pub to: VideoStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One entry of a record's approval history.
///
/// Serialized with the action as a tag, e.g.
/// `{"action":"reverted","by":"…","role":"admin","from":"completed",…}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApprovalEvent {
    Approved(EventDetails),
    Rejected(EventDetails),
    Reverted(EventDetails),
}

impl ApprovalEvent {
    pub fn new(action: ApprovalAction, details: EventDetails) -> Self {
        match action {
            ApprovalAction::Approved => ApprovalEvent::Approved(details),
            ApprovalAction::Rejected => ApprovalEvent::Rejected(details),
            ApprovalAction::Reverted => ApprovalEvent::Reverted(details),
        }
    }

    pub fn action(&self) -> ApprovalAction {
        match self {
            ApprovalEvent::Approved(_) => ApprovalAction::Approved,
            ApprovalEvent::Rejected(_) => ApprovalAction::Rejected,
            ApprovalEvent::Reverted(_) => ApprovalAction::Reverted,
        }
    }

    pub fn details(&self) -> &EventDetails {
        match self {
            ApprovalEvent::Approved(d) | ApprovalEvent::Rejected(d) | ApprovalEvent::Reverted(d) => d,
        }
    }

    fn details_mut(&mut self) -> &mut EventDetails {
        match self {
            ApprovalEvent::Approved(d) | ApprovalEvent::Rejected(d) | ApprovalEvent::Reverted(d) => d,
        }
    }
}

/// Append-only log of approval events for one record.
///
/// There is no way to edit or remove an entry once appended. Timestamps are
/// strictly increasing: an event whose clock reading is not after the last
/// entry is stamped one microsecond after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalHistory(Vec<ApprovalEvent>);

impl ApprovalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, mut event: ApprovalEvent) -> &ApprovalEvent {
        if let Some(last) = self.0.last() {
            let floor = last.details().timestamp;
            let details = event.details_mut();
            if details.timestamp <= floor {
                details.timestamp = floor + Duration::microseconds(1);
            }
        }
        self.0.push(event);
        &self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&ApprovalEvent> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApprovalEvent> {
        self.0.iter()
    }

    pub fn entries(&self) -> &[ApprovalEvent] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ApprovalHistory {
    type Item = &'a ApprovalEvent;
    type IntoIter = std::slice::Iter<'a, ApprovalEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_at(timestamp: DateTime<Utc>) -> EventDetails {
        EventDetails {
            by: Uuid::new_v4(),
            role: Role::Admin,
            from: VideoStatus::MediaReview,
            to: VideoStatus::YoutubeReady,
            timestamp,
            comment: None,
        }
    }

    #[test]
    fn event_serializes_with_action_tag() {
        let event = ApprovalEvent::new(
            ApprovalAction::Reverted,
            EventDetails {
                comment: Some("wrong cut".into()),
                ..details_at(Utc::now())
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "reverted");
        assert_eq!(value["from"], "media_review");
        assert_eq!(value["comment"], "wrong cut");

        let back: ApprovalEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn comment_is_omitted_when_absent() {
        let event = ApprovalEvent::new(ApprovalAction::Approved, details_at(Utc::now()));
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn unknown_action_is_rejected() {
        let json = r#"{"action":"deleted","by":"00000000-0000-0000-0000-000000000000",
            "role":"admin","from":"pending","to":"in_progress",
            "timestamp":"2026-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<ApprovalEvent>(json).is_err());
    }

    #[test]
    fn append_keeps_timestamps_strictly_increasing() {
        let now = Utc::now();
        let mut history = ApprovalHistory::new();
        history.append(ApprovalEvent::new(ApprovalAction::Approved, details_at(now)));
        // Same clock reading, then an earlier one.
        history.append(ApprovalEvent::new(ApprovalAction::Rejected, details_at(now)));
        history.append(ApprovalEvent::new(
            ApprovalAction::Reverted,
            details_at(now - Duration::seconds(5)),
        ));

        let stamps: Vec<_> = history.iter().map(|e| e.details().timestamp).collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stamps[0], now);
    }

    #[test]
    fn history_serializes_as_plain_array() {
        let mut history = ApprovalHistory::new();
        history.append(ApprovalEvent::new(ApprovalAction::Approved, details_at(Utc::now())));
        let value = serde_json::to_value(&history).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["action"], "approved");
    }
}
