mod audit;
pub mod policy;
mod record;
mod role;
mod status;
mod validator;

pub use audit::{ApprovalAction, ApprovalEvent, ApprovalHistory, EventDetails};
pub use policy::{
    can_revert, can_revert_state_str, can_see_details, can_see_video, can_see_video_details_str,
    can_see_video_str, can_unassign, can_unassign_video_str, filter_visible, visible_statuses,
};
pub use record::{OptimizationDetails, ProgressReport, SecondaryStatus, VideoMetadata, VideoRecord};
pub use role::{Actor, Role};
pub use status::{Stage, VideoStatus, previous_status};
pub use validator::{Command, CommentRules, TransitionOutcome, TransitionValidator, Validated};
