//! Job bodies. Each step persists the status, then publishes it.

use std::sync::Arc;

use deckhand_core::project::ProjectService;
use deckhand_core::slug::PENDING_PROJECT_PATH;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use deckhand_db::models::slide::Slide;
use deckhand_db::SlideStore;
use deckhand_events::{EventBus, SlideEvent};

use crate::jobs::{JobError, SlideJob};

/// Everything a job needs to run.
#[derive(Clone)]
pub struct JobContext {
    pub store: Arc<dyn SlideStore>,
    pub service: Arc<ProjectService>,
    pub events: Arc<EventBus>,
}

/// Run one job to completion. `attempt` is 1 for the first run.
///
/// A retry only resumes a record its own earlier attempt left `failed`.
/// Anything else means another job has claimed the record since, and the
/// retry ends with [`JobError::InvalidState`].
pub async fn perform(ctx: &JobContext, job: &SlideJob, attempt: u32) -> Result<(), JobError> {
    match job {
        SlideJob::CreateProject {
            slide_id,
            initial_content,
        } => create_project(ctx, *slide_id, initial_content, attempt).await,
        SlideJob::BuildProject { slide_id } => build_project(ctx, *slide_id, attempt).await,
    }
}

/// Statuses a job may claim its record from.
fn claimable_from(job_claimed_by_handler: bool, attempt: u32) -> Vec<SlideStatus> {
    if attempt > 1 {
        return vec![SlideStatus::Failed];
    }
    let mut from = SlideStatus::Building.sources();
    if job_claimed_by_handler {
        from.push(SlideStatus::Building);
    }
    from
}

async fn create_project(
    ctx: &JobContext,
    slide_id: DbId,
    initial_content: &str,
    attempt: u32,
) -> Result<(), JobError> {
    let slide = claim(ctx, slide_id, &claimable_from(false, attempt)).await?;
    tracing::info!(slide_id, slug = %slide.slug, "Creating Slidev project");

    let result = scaffold_and_build(ctx, &slide, initial_content).await;
    match result {
        Ok(()) => {
            finish(ctx, slide_id, SlideStatus::Completed, None).await?;
            tracing::info!(slide_id, slug = %slide.slug, "Slidev project created");
            Ok(())
        }
        Err(err) => {
            remove_partial_project(ctx, slide_id, &slide.slug).await;
            let message = err.to_string();
            finish(ctx, slide_id, SlideStatus::Failed, Some(&message)).await?;
            tracing::error!(slide_id, slug = %slide.slug, error = %message, "Project creation failed");
            Err(err)
        }
    }
}

async fn scaffold_and_build(
    ctx: &JobContext,
    slide: &Slide,
    initial_content: &str,
) -> Result<(), JobError> {
    let path = ctx.service.scaffold(&slide.slug).await?;
    let path = path.to_string_lossy().into_owned();

    if ctx.store.set_project_path(slide.id, &path).await?.is_none() {
        // Deleted while scaffolding; nothing else will ever remove this tree.
        if let Err(e) = ctx.service.delete(&slide.slug, &path).await {
            tracing::warn!(slide_id = slide.id, error = %e, "Could not remove orphaned project");
        }
        return Err(JobError::RecordMissing { slide_id: slide.id });
    }

    ctx.service.write_source(&path, initial_content).await?;
    ctx.service.build(&slide.slug, &path).await?;
    Ok(())
}

/// Best-effort removal of the source tree a failed create left behind.
/// The build log and any output stay for diagnosis.
async fn remove_partial_project(ctx: &JobContext, slide_id: DbId, slug: &str) {
    let project_path = match ctx.store.find(slide_id).await {
        Ok(Some(slide)) => slide.project_path,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(slide_id, error = %e, "Could not reload slide for cleanup");
            return;
        }
    };
    if project_path == PENDING_PROJECT_PATH {
        return;
    }

    if let Err(e) = ctx.service.remove_project_dir(&project_path).await {
        tracing::warn!(slide_id, slug, error = %e, "Cleanup after failed create was incomplete");
    }
    if let Err(e) = ctx.store.set_project_path(slide_id, PENDING_PROJECT_PATH).await {
        tracing::warn!(slide_id, error = %e, "Could not reset project path");
    }
}

async fn build_project(ctx: &JobContext, slide_id: DbId, attempt: u32) -> Result<(), JobError> {
    // The build handler claims the record before enqueueing, so a first
    // attempt starts from `building`.
    let slide = claim(ctx, slide_id, &claimable_from(true, attempt)).await?;
    tracing::info!(slide_id, slug = %slide.slug, "Building Slidev project");

    match ctx.service.build(&slide.slug, &slide.project_path).await {
        Ok(output) => {
            finish(ctx, slide_id, SlideStatus::Completed, None).await?;
            tracing::info!(slide_id, output = %output.display(), "Slidev build completed");
            Ok(())
        }
        Err(err) => {
            let message = err.to_string();
            finish(ctx, slide_id, SlideStatus::Failed, Some(&message)).await?;
            tracing::error!(slide_id, slug = %slide.slug, error = %message, "Slidev build failed");
            Err(err.into())
        }
    }
}

/// Move the record to `building`, clearing the previous error.
async fn claim(ctx: &JobContext, slide_id: DbId, from: &[SlideStatus]) -> Result<Slide, JobError> {
    let claimed = ctx
        .store
        .transition(slide_id, from, SlideStatus::Building, None)
        .await?;

    match claimed {
        Some(slide) => {
            ctx.events.publish(SlideEvent::status_changed(&slide));
            Ok(slide)
        }
        None => match ctx.store.find(slide_id).await? {
            None => Err(JobError::RecordMissing { slide_id }),
            Some(slide) => Err(JobError::InvalidState {
                slide_id,
                status: slide.status,
            }),
        },
    }
}

/// Persist the terminal status and publish it. A record deleted mid-job
/// is logged and otherwise ignored.
async fn finish(
    ctx: &JobContext,
    slide_id: DbId,
    to: SlideStatus,
    error_message: Option<&str>,
) -> Result<(), JobError> {
    match ctx.store.advance(slide_id, to, error_message).await? {
        Some(slide) => ctx.events.publish(SlideEvent::status_changed(&slide)),
        None => tracing::warn!(slide_id, status = %to, "Slide vanished before its status was saved"),
    }
    Ok(())
}
