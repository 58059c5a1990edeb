//! Role-indexed access tables.
//!
//! Each table is a fixed slice per role, matched on the closed [`Role`] enum.
//! Any (role, status) pair that is not listed is denied. `admin` bypasses
//! the visibility, detail and revert tables but not the unassign rule.

use tracing::debug;

use super::record::VideoRecord;
use super::role::Role;
use super::status::VideoStatus;

use VideoStatus::*;

const ALL_STATUSES: &[VideoStatus] = &VideoStatus::ALL;

const OPTIMIZER_VISIBLE: &[VideoStatus] = &[Available, ContentCorrections, Completed];
const YOUTUBER_VISIBLE: &[VideoStatus] = &[UploadMedia, MediaCorrections, Completed];
const REVIEWER_VISIBLE: &[VideoStatus] = &[ContentReview, MediaReview, Completed];
const CONTENT_REVIEWER_VISIBLE: &[VideoStatus] = &[ContentReview];
const MEDIA_REVIEWER_VISIBLE: &[VideoStatus] = &[MediaReview];

const OPTIMIZER_DETAILS: &[VideoStatus] = &[Available, ContentCorrections];
const YOUTUBER_DETAILS: &[VideoStatus] = &[UploadMedia, MediaCorrections];
const REVIEWER_DETAILS: &[VideoStatus] = &[ContentReview, MediaReview];
const CONTENT_REVIEWER_DETAILS: &[VideoStatus] = &[ContentReview];
const MEDIA_REVIEWER_DETAILS: &[VideoStatus] = &[MediaReview];

const OPTIMIZER_REVERT: &[VideoStatus] = &[InProgress, OptimizeReview, TitleCorrections];
const CONTENT_REVIEWER_REVERT: &[VideoStatus] = &[ContentReview, ContentCorrections];
const MEDIA_REVIEWER_REVERT: &[VideoStatus] = &[MediaReview, MediaCorrections];
const YOUTUBER_REVERT: &[VideoStatus] = &[UploadMedia, MediaCorrections];
const REVIEWER_REVERT: &[VideoStatus] = &[OptimizeReview, TitleCorrections, YoutubeReady, Completed];

const YOUTUBER_UNASSIGN: &[VideoStatus] = &[UploadMedia, MediaCorrections];
/// Statuses an admin can no longer unassign: finished or awaiting publication.
const ADMIN_UNASSIGN_LOCKED: &[VideoStatus] = &[Completed, YoutubeReady, EnRevision];

/// Listed for youtuber and reviewer visibility but absent from the status
/// catalog, so only the label-level visibility check can see it.
const FINAL_REVIEW: &str = "final_review";
const FINAL_REVIEW_VISIBLE: &[Role] = &[Role::Admin, Role::Youtuber, Role::Reviewer];

/// Statuses the role may list and search.
pub fn visible_statuses(role: Role) -> &'static [VideoStatus] {
    match role {
        Role::Admin => ALL_STATUSES,
        Role::Optimizer => OPTIMIZER_VISIBLE,
        Role::Youtuber => YOUTUBER_VISIBLE,
        Role::Reviewer => REVIEWER_VISIBLE,
        Role::ContentReviewer => CONTENT_REVIEWER_VISIBLE,
        Role::MediaReviewer => MEDIA_REVIEWER_VISIBLE,
        Role::Uploader => &[],
    }
}

/// Statuses for which the role may open the full, editable record.
pub fn detail_statuses(role: Role) -> &'static [VideoStatus] {
    match role {
        Role::Admin => ALL_STATUSES,
        Role::Optimizer => OPTIMIZER_DETAILS,
        Role::Youtuber => YOUTUBER_DETAILS,
        Role::Reviewer => REVIEWER_DETAILS,
        Role::ContentReviewer => CONTENT_REVIEWER_DETAILS,
        Role::MediaReviewer => MEDIA_REVIEWER_DETAILS,
        Role::Uploader => &[],
    }
}

/// Statuses the role may revert from.
pub fn revert_statuses(role: Role) -> &'static [VideoStatus] {
    match role {
        Role::Admin => ALL_STATUSES,
        Role::Optimizer => OPTIMIZER_REVERT,
        Role::ContentReviewer => CONTENT_REVIEWER_REVERT,
        Role::MediaReviewer => MEDIA_REVIEWER_REVERT,
        Role::Youtuber => YOUTUBER_REVERT,
        Role::Reviewer => REVIEWER_REVERT,
        Role::Uploader => &[],
    }
}

pub fn can_see_video(role: Role, status: VideoStatus) -> bool {
    let allowed = role.is_admin() || visible_statuses(role).contains(&status);
    debug!(%role, %status, allowed, "visibility check");
    allowed
}

pub fn can_see_details(role: Role, status: VideoStatus) -> bool {
    let allowed = role.is_admin() || detail_statuses(role).contains(&status);
    debug!(%role, %status, allowed, "detail access check");
    allowed
}

pub fn can_revert(role: Role, status: VideoStatus) -> bool {
    let allowed = role.is_admin() || revert_statuses(role).contains(&status);
    debug!(%role, %status, allowed, "revert check");
    allowed
}

pub fn can_unassign(role: Role, status: VideoStatus) -> bool {
    let allowed = match role {
        Role::Admin => !ADMIN_UNASSIGN_LOCKED.contains(&status),
        Role::Youtuber => YOUTUBER_UNASSIGN.contains(&status),
        _ => false,
    };
    debug!(%role, %status, allowed, "unassign check");
    allowed
}

/// Keeps only the records the role is allowed to list.
pub fn filter_visible<'a, I>(role: Role, records: I) -> impl Iterator<Item = &'a VideoRecord>
where
    I: IntoIterator<Item = &'a VideoRecord>,
{
    records
        .into_iter()
        .filter(move |record| can_see_video(role, record.status()))
}

/// Parses raw labels and applies `check`. Unknown labels deny.
fn check_labels(role: &str, status: &str, check: fn(Role, VideoStatus) -> bool) -> bool {
    match (role.parse::<Role>(), status.parse::<VideoStatus>()) {
        (Ok(role), Ok(status)) => check(role, status),
        (role_res, status_res) => {
            debug!(
                role,
                status,
                role_known = role_res.is_ok(),
                status_known = status_res.is_ok(),
                "denying unknown label"
            );
            false
        }
    }
}

pub fn can_see_video_str(role: &str, status: &str) -> bool {
    if status == FINAL_REVIEW {
        let allowed = role
            .parse::<Role>()
            .is_ok_and(|role| FINAL_REVIEW_VISIBLE.contains(&role));
        debug!(role, status, allowed, "visibility check");
        return allowed;
    }
    check_labels(role, status, can_see_video)
}

pub fn can_see_video_details_str(role: &str, status: &str) -> bool {
    check_labels(role, status, can_see_details)
}

pub fn can_revert_state_str(role: &str, status: &str) -> bool {
    check_labels(role, status, can_revert)
}

pub fn can_unassign_video_str(role: &str, status: &str) -> bool {
    check_labels(role, status, can_unassign)
}
