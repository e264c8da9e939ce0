//! HTML handlers for the `/slides` resource.
//!
//! Every state-changing action answers with a `303` redirect to the
//! listing carrying a notice or alert; form validation failures re-render
//! the form with `422`.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use deckhand_core::error::CoreError;
use deckhand_core::slug::derive_slug;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use deckhand_db::models::slide::{CreateSlide, Slide};
use deckhand_db::StoreError;
use deckhand_events::SlideEvent;
use deckhand_worker::SlideJob;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::flash::{redirect_with, Flash};
use crate::state::AppState;
use crate::views::{
    EditTemplate, FlashView, IndexTemplate, NewTemplate, RowTemplate, ShowTemplate, SlideView,
};

const SLIDES_PATH: &str = "/slides";
const BUSY_ALERT: &str = "This slide is currently building";

#[derive(Debug, Deserialize)]
pub struct SlideForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourceForm {
    #[serde(default)]
    pub slides_content: String,
}

/// GET / and GET /slides
pub async fn index(
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> AppResult<Html<String>> {
    let slides = state
        .store
        .list()
        .await?
        .iter()
        .map(|slide| SlideView::new(slide, &state.service))
        .collect();
    render(&IndexTemplate {
        flash: flash.into(),
        slides,
    })
}

/// GET /slides/new
pub async fn new_form() -> AppResult<Html<String>> {
    render(&NewTemplate {
        flash: FlashView::default(),
        name: String::new(),
        description: String::new(),
        errors: Vec::new(),
    })
}

/// POST /slides
pub async fn create(State(state): State<AppState>, Form(form): Form<SlideForm>) -> AppResult<Response> {
    let name = form.name.trim().to_string();
    let description = form
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let slug = match validate_new_slide(&state, &name).await? {
        Ok(slug) => slug,
        Err(errors) => return new_form_with_errors(name, description, errors),
    };

    let input = CreateSlide {
        name: name.clone(),
        slug,
        description: description.clone(),
    };
    let slide = match state.store.create(&input).await {
        Ok(slide) => slide,
        // Lost a race with a concurrent insert of the same name or slug.
        Err(err @ StoreError::Duplicate { .. }) => {
            return new_form_with_errors(name, description, vec![err.to_string()]);
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(slide_id = slide.id, slug = %slide.slug, "Slide created");
    state.event_bus.publish(SlideEvent::created(&slide));

    if let Err(e) = state.jobs.enqueue(SlideJob::create(slide.id)) {
        let message = format!("Could not queue project creation: {e}");
        mark_failed(&state, slide.id, &[SlideStatus::Pending], &message).await;
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(message)).into_response());
    }

    Ok(redirect_with(
        SLIDES_PATH,
        Flash::notice("Creating slide. This may take a moment..."),
    )
    .into_response())
}

/// Derive the slug and check name/slug uniqueness.
///
/// The outer `Result` carries store failures; the inner one the
/// user-facing validation errors.
async fn validate_new_slide(
    state: &AppState,
    name: &str,
) -> AppResult<Result<String, Vec<String>>> {
    let slug = match derive_slug(name) {
        Ok(slug) => slug,
        Err(CoreError::Validation(msg)) => return Ok(Err(vec![msg])),
        Err(other) => return Err(other.into()),
    };

    let mut errors = Vec::new();
    if state.store.find_by_name(name).await?.is_some() {
        errors.push("Name has already been taken".to_string());
    }
    if state.store.find_by_slug(&slug).await?.is_some() {
        errors.push(format!(
            "The slug \"{slug}\" generated from this name is already in use"
        ));
    }

    Ok(if errors.is_empty() { Ok(slug) } else { Err(errors) })
}

fn new_form_with_errors(
    name: String,
    description: Option<String>,
    errors: Vec<String>,
) -> AppResult<Response> {
    let html = render(&NewTemplate {
        flash: FlashView::default(),
        name,
        description: description.unwrap_or_default(),
        errors,
    })?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
}

/// GET /slides/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(flash): Query<Flash>,
) -> AppResult<Html<String>> {
    let slide = find_slide(&state, id).await?;
    render(&ShowTemplate {
        flash: flash.into(),
        slide: SlideView::new(&slide, &state.service),
    })
}

/// GET /slides/{id}/slide_html -- the listing row alone, for polling clients.
pub async fn row(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Html<String>> {
    let slide = find_slide(&state, id).await?;
    let view = SlideView::new(&slide, &state.service);
    render(&RowTemplate { slide: &view })
}

/// GET /slides/{id}/edit
pub async fn edit(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let slide = find_slide(&state, id).await?;
    if slide.is_busy() {
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(BUSY_ALERT)).into_response());
    }

    match state.service.read_source(&slide.project_path).await {
        Ok(content) => Ok(render(&EditTemplate {
            flash: FlashView::default(),
            slide: SlideView::new(&slide, &state.service),
            content,
        })?
        .into_response()),
        Err(e) => Ok(redirect_with(
            SLIDES_PATH,
            Flash::alert(format!("Could not load the editor: {e}")),
        )
        .into_response()),
    }
}

/// POST /slides/{id} and PUT /slides/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(form): Form<SourceForm>,
) -> AppResult<Response> {
    let slide = find_slide(&state, id).await?;
    if slide.is_busy() {
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(BUSY_ALERT)).into_response());
    }

    match state
        .service
        .write_source(&slide.project_path, &form.slides_content)
        .await
    {
        Ok(()) => {
            tracing::info!(slide_id = id, "slides.md updated");
            Ok(redirect_with(SLIDES_PATH, Flash::notice("Slide updated")).into_response())
        }
        Err(e) => {
            tracing::warn!(slide_id = id, error = %e, "Failed to write slides.md");
            let html = render(&EditTemplate {
                flash: FlashView {
                    notice: String::new(),
                    alert: format!("Update failed: {e}"),
                },
                slide: SlideView::new(&slide, &state.service),
                content: form.slides_content,
            })?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
    }
}

/// POST /slides/{id}/build
///
/// Claims the record (`pending | completed | failed -> building`) before
/// enqueueing, so a second request for the same slide is refused.
pub async fn build(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let slide = find_slide(&state, id).await?;
    if slide.is_busy() {
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(BUSY_ALERT)).into_response());
    }

    let Some(claimed) = state.store.advance(id, SlideStatus::Building, None).await? else {
        tracing::info!(slide_id = id, "Build already claimed");
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(BUSY_ALERT)).into_response());
    };
    state.event_bus.publish(SlideEvent::status_changed(&claimed));

    if let Err(e) = state.jobs.enqueue(SlideJob::build(id)) {
        let message = format!("Could not queue build: {e}");
        mark_failed(&state, id, &[SlideStatus::Building], &message).await;
        return Ok(redirect_with(SLIDES_PATH, Flash::alert(message)).into_response());
    }

    Ok(redirect_with(
        SLIDES_PATH,
        Flash::notice("Building slide. This may take a moment..."),
    )
    .into_response())
}

/// POST /slides/{id}/delete and DELETE /slides/{id}
///
/// Files go first; the record is only removed once they are gone, so a
/// failed cleanup leaves something to retry from.
pub async fn destroy(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let slide = find_slide(&state, id).await?;

    if let Err(e) = state.service.delete(&slide.slug, &slide.project_path).await {
        tracing::warn!(slide_id = id, error = %e, "Slide file cleanup failed");
        return Ok(
            redirect_with(SLIDES_PATH, Flash::alert(format!("Delete failed: {e}"))).into_response(),
        );
    }

    if state.store.delete(id).await? {
        tracing::info!(slide_id = id, slug = %slide.slug, "Slide deleted");
        state.event_bus.publish(SlideEvent::deleted(&slide));
    }
    Ok(redirect_with(SLIDES_PATH, Flash::notice("Slide deleted")).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_slide(state: &AppState, id: DbId) -> AppResult<Slide> {
    state
        .store
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(id))
}

/// Record an enqueue failure on the slide so the listing shows it.
async fn mark_failed(state: &AppState, id: DbId, from: &[SlideStatus], message: &str) {
    match state
        .store
        .transition(id, from, SlideStatus::Failed, Some(message))
        .await
    {
        Ok(Some(slide)) => state.event_bus.publish(SlideEvent::status_changed(&slide)),
        Ok(None) => {}
        Err(e) => tracing::error!(slide_id = id, error = %e, "Could not record enqueue failure"),
    }
}

fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}
