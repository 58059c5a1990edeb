use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Action, Result, WorkflowError};
use crate::store::VideoStore;
use crate::workflow::{
    Actor, Command, Role, TransitionOutcome, TransitionValidator, Validated, VideoRecord,
    VideoStatus, can_see_details, can_see_video,
};

/// Drives commands against a store: fetch, validate, compare-and-swap.
///
/// A lost race (`StaleState`) re-fetches and re-validates, since the
/// command may no longer be allowed against the new status. Any other
/// error is returned as-is without a write.
pub struct WorkflowService<S: VideoStore> {
    store: S,
    validator: TransitionValidator,
    max_attempts: u32,
}

impl<S: VideoStore> WorkflowService<S> {
    pub fn new(store: S, validator: TransitionValidator, max_attempts: u32) -> Self {
        Self {
            store,
            validator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn validator(&self) -> &TransitionValidator {
        &self.validator
    }

    /// Runs `command` and returns the record as stored plus what was committed.
    pub fn execute(&self, actor: &Actor, id: Uuid, command: &Command) -> Result<(VideoRecord, Validated)> {
        self.write(actor, id, |validator, record| validator.apply(actor, record, command))
    }

    pub fn apply_transition(
        &self,
        actor: &Actor,
        id: Uuid,
        to: VideoStatus,
        comment: Option<String>,
    ) -> Result<TransitionOutcome> {
        let (_, outcome) = self.write(actor, id, |validator, record| {
            validator.apply_transition(actor, record, to, comment.clone())
        })?;
        Ok(outcome)
    }

    pub fn apply_revert(&self, actor: &Actor, id: Uuid, comment: Option<String>) -> Result<TransitionOutcome> {
        let (_, outcome) = self.write(actor, id, |validator, record| {
            validator.apply_revert(actor, record, comment.clone())
        })?;
        Ok(outcome)
    }

    /// Clears the assignee and returns who it was.
    pub fn apply_unassign(&self, actor: &Actor, id: Uuid) -> Result<Uuid> {
        let (_, previous) = self.write(actor, id, |validator, record| {
            validator.apply_unassign(actor, record)
        })?;
        Ok(previous)
    }

    /// Fetches, lets `step` validate and commit on a local copy, then writes
    /// it back against the snapshot it was fetched at.
    fn write<T>(
        &self,
        actor: &Actor,
        id: Uuid,
        step: impl Fn(&TransitionValidator, &mut VideoRecord) -> Result<T>,
    ) -> Result<(VideoRecord, T)> {
        let mut attempt = 1;
        loop {
            let mut record = self.store.fetch(id)?;
            let (expected, expected_version) = (record.status(), record.version());
            let committed = step(&self.validator, &mut record)?;

            match self.store.compare_and_swap(expected, expected_version, &record) {
                Ok(()) => return Ok((record, committed)),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        video_id = %id,
                        role = %actor.role,
                        attempt,
                        max = self.max_attempts,
                        "retrying after conflict"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Records the actor's role may list.
    pub fn list(&self, actor: &Actor) -> Result<Vec<VideoRecord>> {
        let records = self.store.list_visible(actor.role)?;
        debug!(role = %actor.role, count = records.len(), "listed records");
        Ok(records)
    }

    /// The record, if the actor may know it exists.
    pub fn find(&self, actor: &Actor, id: Uuid) -> Result<VideoRecord> {
        self.fetch_checked(actor, id, Action::View, can_see_video)
    }

    /// The full, editable record, if the actor may open it.
    pub fn details(&self, actor: &Actor, id: Uuid) -> Result<VideoRecord> {
        self.fetch_checked(actor, id, Action::ViewDetails, can_see_details)
    }

    fn fetch_checked(
        &self,
        actor: &Actor,
        id: Uuid,
        action: Action,
        check: fn(Role, VideoStatus) -> bool,
    ) -> Result<VideoRecord> {
        let record = self.store.fetch(id)?;
        let status = record.status();
        if check(actor.role, status) {
            Ok(record)
        } else {
            warn!(video_id = %id, role = %actor.role, %status, %action, "read denied");
            Err(WorkflowError::Unauthorized {
                role: actor.role,
                action,
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::InMemoryStore;
    use crate::workflow::ApprovalAction;

    fn service() -> WorkflowService<InMemoryStore> {
        WorkflowService::new(InMemoryStore::new(), TransitionValidator::default(), 3)
    }

    fn seed(service: &WorkflowService<InMemoryStore>, status: VideoStatus) -> VideoRecord {
        let record = VideoRecord::new(Uuid::new_v4(), "Episode 12".into()).with_status(status);
        service.store().insert(record.clone()).unwrap();
        record
    }

    #[test]
    fn revert_round_trip_through_store() {
        let service = service();
        let record = seed(&service, VideoStatus::YoutubeReady);
        let reviewer = Actor::new(Uuid::new_v4(), Role::Reviewer);

        service.apply_revert(&reviewer, record.id, None).unwrap();

        let stored = service.store().fetch(record.id).unwrap();
        assert_eq!(stored.status(), VideoStatus::YoutubeReady.previous().unwrap());
        assert_eq!(stored.history().len(), record.history().len() + 1);
        let event = stored.history().last().unwrap();
        assert_eq!(event.action(), ApprovalAction::Reverted);
        assert_eq!(event.details().by, reviewer.user_id);
    }

    #[test]
    fn denied_command_does_not_write() {
        let service = service();
        let record = seed(&service, VideoStatus::Completed);
        let youtuber = Actor::new(Uuid::new_v4(), Role::Youtuber);

        for _ in 0..2 {
            let err = service.apply_revert(&youtuber, record.id, None).unwrap_err();
            assert_eq!(err.http_status(), 403);
        }
        assert_eq!(service.store().fetch(record.id).unwrap(), record);
    }

    #[test]
    fn missing_record_is_not_found() {
        let service = service();
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let err = service
            .apply_transition(&admin, Uuid::new_v4(), VideoStatus::InProgress, None)
            .unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn details_are_stricter_than_visibility() {
        let service = service();
        let record = seed(&service, VideoStatus::Completed);
        let optimizer = Actor::new(Uuid::new_v4(), Role::Optimizer);

        assert!(service.find(&optimizer, record.id).is_ok());
        let err = service.details(&optimizer, record.id).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Unauthorized {
                action: Action::ViewDetails,
                ..
            }
        ));
    }

    #[test]
    fn unassign_through_service() {
        let service = service();
        let editor = Uuid::new_v4();
        let record = VideoRecord::new(Uuid::new_v4(), "Vlog".into())
            .with_status(VideoStatus::MediaCorrections)
            .with_assignee(editor);
        service.store().insert(record.clone()).unwrap();

        let youtuber = Actor::new(Uuid::new_v4(), Role::Youtuber);
        assert_eq!(service.apply_unassign(&youtuber, record.id).unwrap(), editor);
        let stored = service.store().fetch(record.id).unwrap();
        assert!(!stored.is_assigned());
        assert_eq!(stored.version(), record.version() + 1);
    }

    #[test]
    fn execute_dispatches_commands() {
        let service = service();
        let record = seed(&service, VideoStatus::InProgress);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);

        let (stored, committed) = service
            .execute(
                &admin,
                record.id,
                &Command::Advance {
                    to: VideoStatus::OptimizeReview,
                    comment: None,
                },
            )
            .unwrap();
        assert_eq!(stored.status(), VideoStatus::OptimizeReview);
        assert!(matches!(committed, Validated::Transition(ref o) if o.from == VideoStatus::InProgress));
    }

    #[test]
    fn list_is_filtered_by_role() {
        let service = service();
        seed(&service, VideoStatus::ContentReview);
        seed(&service, VideoStatus::MediaReview);
        seed(&service, VideoStatus::UploadMedia);

        let content = Actor::new(Uuid::new_v4(), Role::ContentReviewer);
        let listed = service.list(&content).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status(), VideoStatus::ContentReview);
    }

    /// Store that lets a rival writer land between fetch and write.
    struct RacingStore {
        inner: InMemoryStore,
        races_left: Cell<u32>,
        rival: fn(&mut VideoRecord),
    }

    impl RacingStore {
        fn new(races: u32, rival: fn(&mut VideoRecord)) -> Self {
            Self {
                inner: InMemoryStore::new(),
                races_left: Cell::new(races),
                rival,
            }
        }
    }

    impl VideoStore for RacingStore {
        fn fetch(&self, id: Uuid) -> Result<VideoRecord> {
            let record = self.inner.fetch(id)?;
            if self.races_left.get() > 0 {
                self.races_left.set(self.races_left.get() - 1);
                let mut rival = record.clone();
                (self.rival)(&mut rival);
                self.inner
                    .compare_and_swap(record.status(), record.version(), &rival)?;
            }
            Ok(record)
        }

        fn insert(&self, record: VideoRecord) -> Result<()> {
            self.inner.insert(record)
        }

        fn compare_and_swap(
            &self,
            expected: VideoStatus,
            expected_version: u64,
            record: &VideoRecord,
        ) -> Result<()> {
            self.inner.compare_and_swap(expected, expected_version, record)
        }

        fn list_by_status(&self, statuses: &[VideoStatus]) -> Result<Vec<VideoRecord>> {
            self.inner.list_by_status(statuses)
        }
    }

    fn rival_actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn lost_race_revalidates_against_new_status() {
        // Admin approves media_review; a rival rejects it first. The retry
        // sees media_corrections, where youtube_ready is no longer an edge.
        let store = RacingStore::new(1, |record| {
            TransitionValidator::default()
                .apply_transition(
                    &rival_actor(Role::MediaReviewer),
                    record,
                    VideoStatus::MediaCorrections,
                    Some("audio clipping".into()),
                )
                .unwrap();
        });
        let record = VideoRecord::new(Uuid::new_v4(), "Race".into()).with_status(VideoStatus::MediaReview);
        store.insert(record.clone()).unwrap();

        let service = WorkflowService::new(store, TransitionValidator::default(), 3);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let err = service
            .apply_transition(&admin, record.id, VideoStatus::YoutubeReady, None)
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: VideoStatus::MediaCorrections,
                to: VideoStatus::YoutubeReady,
            }
        ));
        let stored = service.store().fetch(record.id).unwrap();
        assert_eq!(stored.history().len(), 1);
        assert_eq!(stored.history().last().unwrap().action(), ApprovalAction::Rejected);
    }

    #[test]
    fn record_returning_to_the_same_status_keeps_rival_history() {
        // Between fetch and write, an admin reverts media_review to
        // upload_media and the youtuber resubmits it. The status matches
        // again, but the late approval must not overwrite those entries.
        let store = RacingStore::new(1, |record| {
            let validator = TransitionValidator::default();
            validator
                .apply_revert(&rival_actor(Role::Admin), record, Some("wrong cut".into()))
                .unwrap();
            validator
                .apply_transition(&rival_actor(Role::Youtuber), record, VideoStatus::MediaReview, None)
                .unwrap();
        });
        let record = VideoRecord::new(Uuid::new_v4(), "Bounce".into()).with_status(VideoStatus::MediaReview);
        store.insert(record.clone()).unwrap();

        let service = WorkflowService::new(store, TransitionValidator::default(), 3);
        let reviewer = Actor::new(Uuid::new_v4(), Role::MediaReviewer);
        service
            .apply_transition(&reviewer, record.id, VideoStatus::YoutubeReady, None)
            .unwrap();

        let stored = service.store().fetch(record.id).unwrap();
        assert_eq!(stored.status(), VideoStatus::YoutubeReady);
        assert_eq!(stored.version(), 3);
        let trail: Vec<_> = stored
            .history()
            .iter()
            .map(|event| (event.action(), event.details().from, event.details().to))
            .collect();
        assert_eq!(
            trail,
            vec![
                (ApprovalAction::Reverted, VideoStatus::MediaReview, VideoStatus::UploadMedia),
                (ApprovalAction::Approved, VideoStatus::UploadMedia, VideoStatus::MediaReview),
                (ApprovalAction::Approved, VideoStatus::MediaReview, VideoStatus::YoutubeReady),
            ]
        );
    }

    #[test]
    fn conflicts_beyond_attempt_budget_surface_stale_state() {
        // Rival keeps flipping the status, so each attempt loses the CAS.
        let store = RacingStore::new(u32::MAX, |record| {
            let validator = TransitionValidator::default();
            let admin = rival_actor(Role::Admin);
            match record.status() {
                VideoStatus::InProgress => validator
                    .apply_transition(&admin, record, VideoStatus::OptimizeReview, None)
                    .unwrap(),
                _ => validator.apply_revert(&admin, record, None).unwrap(),
            };
        });
        let record = VideoRecord::new(Uuid::new_v4(), "Flapping".into()).with_status(VideoStatus::InProgress);
        store.insert(record.clone()).unwrap();

        let service = WorkflowService::new(store, TransitionValidator::default(), 2);
        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        let err = service.apply_revert(&admin, record.id, None).unwrap_err();
        assert!(err.is_retryable());
    }
}
