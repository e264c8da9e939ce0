//! Askama templates and the view models they render.

use askama::Template;
use deckhand_core::project::ProjectService;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use deckhand_db::models::slide::Slide;

use crate::flash::Flash;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Display-ready projection of a [`Slide`].
#[derive(Debug, Clone)]
pub struct SlideView {
    pub id: DbId,
    /// DOM id of the listing row, `slide_<id>`.
    pub dom_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub busy: bool,
    pub completed: bool,
    pub failed: bool,
    pub error_message: String,
    /// Where the published build is served, e.g. `/decks/demo/`.
    pub public_url: String,
    pub project_path: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SlideView {
    pub fn new(slide: &Slide, service: &ProjectService) -> Self {
        Self {
            id: slide.id,
            dom_id: format!("slide_{}", slide.id),
            name: slide.name.clone(),
            slug: slide.slug.clone(),
            description: slide.description.clone().unwrap_or_default(),
            status: slide.status.as_str(),
            status_label: status_label(slide.status),
            busy: slide.status.is_busy(),
            completed: slide.status == SlideStatus::Completed,
            failed: slide.status == SlideStatus::Failed,
            error_message: slide.error_message.clone().unwrap_or_default(),
            public_url: service.public_url(&slide.slug),
            project_path: slide.project_path.clone(),
            created_at: slide.created_at.format(TIMESTAMP_FORMAT).to_string(),
            updated_at: slide.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

fn status_label(status: SlideStatus) -> &'static str {
    match status {
        SlideStatus::Pending => "Pending",
        SlideStatus::Building => "Building",
        SlideStatus::Completed => "Ready",
        SlideStatus::Failed => "Failed",
    }
}

/// Flash messages as plain strings; empty means absent.
#[derive(Debug, Clone, Default)]
pub struct FlashView {
    pub notice: String,
    pub alert: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            notice: flash.notice.unwrap_or_default(),
            alert: flash.alert.unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "slides/index.html")]
pub struct IndexTemplate {
    pub flash: FlashView,
    pub slides: Vec<SlideView>,
}

/// A single listing row; also what live updates push to clients.
#[derive(Template)]
#[template(path = "slides/_row.html")]
pub struct RowTemplate<'a> {
    pub slide: &'a SlideView,
}

#[derive(Template)]
#[template(path = "slides/show.html")]
pub struct ShowTemplate {
    pub flash: FlashView,
    pub slide: SlideView,
}

#[derive(Template)]
#[template(path = "slides/new.html")]
pub struct NewTemplate {
    pub flash: FlashView,
    pub name: String,
    pub description: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "slides/edit.html")]
pub struct EditTemplate {
    pub flash: FlashView,
    pub slide: SlideView,
    pub content: String,
}

/// Render the listing row for `slide`.
pub fn render_row(slide: &Slide, service: &ProjectService) -> Result<String, askama::Error> {
    let view = SlideView::new(slide, service);
    RowTemplate { slide: &view }.render()
}
