pub mod health;
pub mod slides;

use axum::routing::get;
use axum::Router;

use crate::handlers::slides_api;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// GET    /slides          -> list
/// GET    /slides/{id}     -> get_by_id
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/slides", get(slides_api::list))
        .route("/slides/{id}", get(slides_api::get_by_id))
}
