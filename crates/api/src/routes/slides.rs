//! Route definitions for the HTML `/slides` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::slides;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// GET    /                          -> index
/// GET    /slides                    -> index
/// POST   /slides                    -> create
/// GET    /slides/new                -> new_form
/// GET    /slides/{id}               -> show
/// POST   /slides/{id}               -> update
/// PUT    /slides/{id}               -> update
/// DELETE /slides/{id}               -> destroy
/// GET    /slides/{id}/edit          -> edit
/// POST   /slides/{id}/build         -> build
/// POST   /slides/{id}/delete        -> destroy
/// GET    /slides/{id}/slide_html    -> row
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(slides::index))
        .route("/slides", get(slides::index).post(slides::create))
        .route("/slides/new", get(slides::new_form))
        .route(
            "/slides/{id}",
            get(slides::show)
                .post(slides::update)
                .put(slides::update)
                .delete(slides::destroy),
        )
        .route("/slides/{id}/edit", get(slides::edit))
        .route("/slides/{id}/build", post(slides::build))
        .route("/slides/{id}/delete", post(slides::destroy))
        .route("/slides/{id}/slide_html", get(slides::row))
}
