//! JSON handlers for `/api/v1/slides`.

use axum::extract::{Path, State};
use axum::Json;
use deckhand_core::types::DbId;
use deckhand_db::models::slide::Slide;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/slides
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Slide>>>> {
    let slides = state.store.list().await?;
    Ok(Json(DataResponse { data: slides }))
}

/// GET /api/v1/slides/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Slide>>> {
    let slide = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(id))?;
    Ok(Json(DataResponse { data: slide }))
}
