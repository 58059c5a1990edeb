use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::audit::ApprovalAction;
use crate::error::WorkflowError;

/// The production states a video moves through.
///
/// Optimization: PENDING → IN_PROGRESS → OPTIMIZE_REVIEW → TITLE_CORRECTIONS
/// Content:      CONTENT_REVIEW ⇄ CONTENT_CORRECTIONS
/// Media:        AVAILABLE → UPLOAD_MEDIA → MEDIA_REVIEW ⇄ MEDIA_CORRECTIONS
/// Finalization: YOUTUBE_READY → COMPLETED → EN_REVISION
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Pending,
    InProgress,
    OptimizeReview,
    TitleCorrections,
    ContentReview,
    ContentCorrections,
    Available,
    UploadMedia,
    MediaReview,
    MediaCorrections,
    YoutubeReady,
    Completed,
    EnRevision,
}

/// A contiguous range of statuses owned by one kind of collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Optimization,
    Content,
    Media,
    Finalization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Optimization => write!(f, "optimization"),
            Stage::Content => write!(f, "content"),
            Stage::Media => write!(f, "media"),
            Stage::Finalization => write!(f, "finalization"),
        }
    }
}

/// Forward edges of the pipeline and the audit action each one records.
const FORWARD_EDGES: &[(VideoStatus, VideoStatus, ApprovalAction)] = {
    use ApprovalAction::{Approved, Rejected};
    use VideoStatus::*;
    &[
        (Pending, InProgress, Approved),
        (InProgress, OptimizeReview, Approved),
        (OptimizeReview, TitleCorrections, Approved),
        (TitleCorrections, ContentReview, Approved),
        (ContentReview, Available, Approved),
        (ContentReview, ContentCorrections, Rejected),
        (ContentCorrections, ContentReview, Approved),
        (Available, UploadMedia, Approved),
        (UploadMedia, MediaReview, Approved),
        (MediaReview, YoutubeReady, Approved),
        (MediaReview, MediaCorrections, Rejected),
        (MediaCorrections, MediaReview, Approved),
        (YoutubeReady, Completed, Approved),
        (Completed, EnRevision, Rejected),
    ]
};

impl VideoStatus {
    /// Every status in pipeline order.
    pub const ALL: [VideoStatus; 13] = [
        VideoStatus::Pending,
        VideoStatus::InProgress,
        VideoStatus::OptimizeReview,
        VideoStatus::TitleCorrections,
        VideoStatus::ContentReview,
        VideoStatus::ContentCorrections,
        VideoStatus::Available,
        VideoStatus::UploadMedia,
        VideoStatus::MediaReview,
        VideoStatus::MediaCorrections,
        VideoStatus::YoutubeReady,
        VideoStatus::Completed,
        VideoStatus::EnRevision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::InProgress => "in_progress",
            VideoStatus::OptimizeReview => "optimize_review",
            VideoStatus::TitleCorrections => "title_corrections",
            VideoStatus::ContentReview => "content_review",
            VideoStatus::ContentCorrections => "content_corrections",
            VideoStatus::Available => "available",
            VideoStatus::UploadMedia => "upload_media",
            VideoStatus::MediaReview => "media_review",
            VideoStatus::MediaCorrections => "media_corrections",
            VideoStatus::YoutubeReady => "youtube_ready",
            VideoStatus::Completed => "completed",
            VideoStatus::EnRevision => "en_revision",
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, VideoStatus::Pending)
    }

    /// End of the pipeline. `completed` can still be reopened into
    /// `en_revision`; `en_revision` has no forward edge.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::EnRevision)
    }

    pub fn stage(&self) -> Stage {
        match self {
            VideoStatus::Pending
            | VideoStatus::InProgress
            | VideoStatus::OptimizeReview
            | VideoStatus::TitleCorrections => Stage::Optimization,
            VideoStatus::ContentReview | VideoStatus::ContentCorrections => Stage::Content,
            VideoStatus::Available
            | VideoStatus::UploadMedia
            | VideoStatus::MediaReview
            | VideoStatus::MediaCorrections => Stage::Media,
            VideoStatus::YoutubeReady | VideoStatus::Completed | VideoStatus::EnRevision => {
                Stage::Finalization
            }
        }
    }

    /// The status a revert from `self` lands on.
    ///
    /// This is a revert-target table, not the inverse of the forward edges:
    /// `title_corrections` is the predecessor of `content_review` even though
    /// `content_corrections` also leads into `content_review`.
    pub fn previous(&self) -> Option<VideoStatus> {
        match self {
            VideoStatus::Pending => None,
            VideoStatus::InProgress => Some(VideoStatus::Pending),
            VideoStatus::OptimizeReview => Some(VideoStatus::InProgress),
            VideoStatus::TitleCorrections => Some(VideoStatus::OptimizeReview),
            VideoStatus::ContentReview => Some(VideoStatus::TitleCorrections),
            VideoStatus::ContentCorrections => Some(VideoStatus::ContentReview),
            VideoStatus::Available => Some(VideoStatus::ContentReview),
            VideoStatus::UploadMedia => Some(VideoStatus::Available),
            VideoStatus::MediaReview => Some(VideoStatus::UploadMedia),
            VideoStatus::MediaCorrections => Some(VideoStatus::MediaReview),
            VideoStatus::YoutubeReady => Some(VideoStatus::MediaReview),
            VideoStatus::Completed => Some(VideoStatus::YoutubeReady),
            VideoStatus::EnRevision => Some(VideoStatus::Completed),
        }
    }

    /// Predecessor chain from `self` back to `pending`, starting with `self`.
    pub fn revert_path(&self) -> Vec<VideoStatus> {
        let mut path = vec![*self];
        let mut current = *self;
        while let Some(prev) = current.previous() {
            path.push(prev);
            current = prev;
        }
        path
    }

    /// Statuses reachable from `self` by a single forward move.
    pub fn next_statuses(&self) -> Vec<VideoStatus> {
        FORWARD_EDGES
            .iter()
            .filter(|(from, _, _)| from == self)
            .map(|(_, to, _)| *to)
            .collect()
    }

    /// The audit action recorded when moving forward from `self` to `to`,
    /// or `None` when the edge does not exist.
    pub fn forward_action(&self, to: VideoStatus) -> Option<ApprovalAction> {
        FORWARD_EDGES
            .iter()
            .find(|(from, target, _)| from == self && *target == to)
            .map(|(_, _, action)| *action)
    }
}

/// Free-function form of [`VideoStatus::previous`].
pub fn previous_status(status: VideoStatus) -> Option<VideoStatus> {
    status.previous()
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownStatus(s.to_string()))
    }
}
