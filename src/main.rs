use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use vidgate::cli::{Cli, Command};
use vidgate::config::VidgateConfig;
use vidgate::service::WorkflowService;
use vidgate::store::{InMemoryStore, VideoStore};
use vidgate::ui::Printer;
use vidgate::workflow::{
    Actor, OptimizationDetails, ProgressReport, Role, TransitionValidator, VideoRecord,
    VideoStatus, can_revert_state_str, can_see_video_details_str, can_see_video_str,
    can_unassign_video_str,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VidgateConfig::load_from(path),
        None => VidgateConfig::load(),
    }
    .context("failed to load configuration")?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let printer = Printer::new();

    match cli.command {
        Command::Check { role, status } => {
            printer.decisions(
                &role,
                &status,
                &[
                    ("canSeeVideo", can_see_video_str(&role, &status)),
                    ("canSeeVideoDetails", can_see_video_details_str(&role, &status)),
                    ("canRevertState", can_revert_state_str(&role, &status)),
                    ("canUnassignVideo", can_unassign_video_str(&role, &status)),
                ],
            );
        }
        Command::Matrix { policy } => printer.matrix(policy),
        Command::Path { status } => printer.revert_path(&status.revert_path()),
        Command::Demo => run_demo(&config, &printer)?,
    }

    Ok(())
}

/// Walks one record through the pipeline against the in-memory store.
fn run_demo(config: &VidgateConfig, printer: &Printer) -> Result<()> {
    let service = WorkflowService::new(
        InMemoryStore::new(),
        TransitionValidator::new(config.comment_rules()),
        config.max_cas_attempts,
    );

    let admin = Actor::new(Uuid::new_v4(), Role::Admin);
    let optimizer = Actor::new(Uuid::new_v4(), Role::Optimizer);
    let content_reviewer = Actor::new(Uuid::new_v4(), Role::ContentReviewer);
    let media_reviewer = Actor::new(Uuid::new_v4(), Role::MediaReviewer);
    let youtuber = Actor::new(Uuid::new_v4(), Role::Youtuber);

    let mut record = VideoRecord::new(Uuid::new_v4(), "How we ship video".into())
        .with_assignee(optimizer.user_id);
    record.set_optimization(OptimizationDetails {
        optimized_title: "How We Ship Video in 2026".into(),
        optimized_description: Some("A tour of the production pipeline.".into()),
        tags: vec!["pipeline".into(), "video".into()],
        optimized_by: optimizer.user_id,
        optimized_at: chrono::Utc::now(),
    });
    let id = record.id;
    service.store().insert(record)?;

    let steps = [
        (admin, VideoStatus::InProgress, None),
        (admin, VideoStatus::OptimizeReview, None),
        (admin, VideoStatus::TitleCorrections, None),
        (admin, VideoStatus::ContentReview, None),
        (
            content_reviewer,
            VideoStatus::ContentCorrections,
            Some("intro runs long"),
        ),
        (optimizer, VideoStatus::ContentReview, Some("trimmed intro")),
        (content_reviewer, VideoStatus::Available, None),
        (optimizer, VideoStatus::UploadMedia, None),
        (youtuber, VideoStatus::MediaReview, None),
        (media_reviewer, VideoStatus::YoutubeReady, None),
    ];
    for (actor, to, comment) in steps {
        service.apply_transition(&actor, id, to, comment.map(String::from))?;
    }

    // The youtuber no longer owns the record once it is ready to publish.
    if let Err(err) = service.apply_revert(&youtuber, id, None) {
        printer.denied(&err.to_string());
    }
    service.apply_revert(&admin, id, Some("thumbnail missing".into()))?;

    if let Err(err) = service.apply_unassign(&media_reviewer, id) {
        printer.denied(&err.to_string());
    }
    service.apply_unassign(&admin, id)?;

    let stored = service.store().fetch(id)?;
    printer.history(&stored);
    printer.report(&ProgressReport::from_record(&stored))?;
    Ok(())
}
