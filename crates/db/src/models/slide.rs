//! Slide entity model and DTOs.

use deckhand_core::status::SlideStatus;
use deckhand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `slides` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Slide {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    /// Scaffolded project directory, or `"pending"` until the create job runs.
    pub project_path: String,
    #[sqlx(try_from = "String")]
    pub status: SlideStatus,
    pub error_message: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Slide {
    /// Whether a create or build job currently owns the record.
    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }
}

/// DTO for inserting a new slide. The slug is derived by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlide {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}
