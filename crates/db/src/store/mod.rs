//! [`SlideStore`]: the persistence seam used by jobs and request handlers.
//!
//! [`PgSlideStore`] delegates to [`SlideRepo`](crate::repositories::SlideRepo);
//! [`MemorySlideStore`] keeps rows in a map for tests and for running the
//! server without a database.

use async_trait::async_trait;
use deckhand_core::error::CoreError;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;

use crate::models::slide::{CreateSlide, Slide};

mod memory;
mod pg;

pub use memory::MemorySlideStore;
pub use pg::PgSlideStore;

/// Unique constraint on `slides.name`.
pub const UQ_SLIDES_NAME: &str = "uq_slides_name";
/// Unique constraint on `slides.slug`.
pub const UQ_SLIDES_SLUG: &str = "uq_slides_slug";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{field} has already been taken")]
    Duplicate { field: &'static str },

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                match db_err.constraint() {
                    Some(UQ_SLIDES_NAME) => return Self::Duplicate { field: "Name" },
                    Some(UQ_SLIDES_SLUG) => return Self::Duplicate { field: "Slug" },
                    _ => {}
                }
            }
        }
        Self::Database(err)
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { .. } => CoreError::Conflict(err.to_string()),
            StoreError::Database(e) => CoreError::Internal(e.to_string()),
        }
    }
}

/// Async access to slide records.
#[async_trait]
pub trait SlideStore: Send + Sync {
    /// All slides, newest first.
    async fn list(&self) -> Result<Vec<Slide>, StoreError>;

    async fn find(&self, id: DbId) -> Result<Option<Slide>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Slide>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Slide>, StoreError>;

    /// Insert with status `pending` and the placeholder project path.
    async fn create(&self, input: &CreateSlide) -> Result<Slide, StoreError>;

    async fn set_project_path(&self, id: DbId, path: &str) -> Result<Option<Slide>, StoreError>;

    /// Move to `to` only if the current status is one of `from`.
    ///
    /// `None` means the record is gone or was not in an accepted status.
    async fn transition(
        &self,
        id: DbId,
        from: &[SlideStatus],
        to: SlideStatus,
        error_message: Option<&str>,
    ) -> Result<Option<Slide>, StoreError>;

    /// Returns `true` if a record was removed.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Connectivity check for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// [`transition`](Self::transition) from every legal source of `to`.
    async fn advance(
        &self,
        id: DbId,
        to: SlideStatus,
        error_message: Option<&str>,
    ) -> Result<Option<Slide>, StoreError> {
        self.transition(id, &to.sources(), to, error_message).await
    }
}
