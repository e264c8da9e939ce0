//! Repository for the `slides` table.

use deckhand_core::slug::PENDING_PROJECT_PATH;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use sqlx::PgPool;

use crate::models::slide::{CreateSlide, Slide};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, project_path, status, error_message, description, \
                       created_at, updated_at";

/// Provides CRUD and status transitions for slides.
pub struct SlideRepo;

impl SlideRepo {
    /// Insert a new slide with status `pending` and the placeholder path.
    pub async fn create(pool: &PgPool, input: &CreateSlide) -> Result<Slide, sqlx::Error> {
        let query = format!(
            "INSERT INTO slides (name, slug, project_path, status, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(PENDING_PROJECT_PATH)
            .bind(SlideStatus::Pending.as_str())
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides WHERE id = $1");
        sqlx::query_as::<_, Slide>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides WHERE name = $1");
        sqlx::query_as::<_, Slide>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides WHERE slug = $1");
        sqlx::query_as::<_, Slide>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all slides, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Slide>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM slides ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Slide>(&query).fetch_all(pool).await
    }

    /// Record the directory produced by scaffolding.
    pub async fn set_project_path(
        pool: &PgPool,
        id: DbId,
        project_path: &str,
    ) -> Result<Option<Slide>, sqlx::Error> {
        let query = format!(
            "UPDATE slides SET project_path = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(id)
            .bind(project_path)
            .fetch_optional(pool)
            .await
    }

    /// Compare-and-swap the status.
    ///
    /// The row is only updated when its current status is one of `from`.
    /// `error_message` replaces the stored message (`None` clears it).
    /// Returns `None` when the row is missing or was in another status.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &[SlideStatus],
        to: SlideStatus,
        error_message: Option<&str>,
    ) -> Result<Option<Slide>, sqlx::Error> {
        let sources: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        let query = format!(
            "UPDATE slides SET status = $3, error_message = $4
             WHERE id = $1 AND status = ANY($2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slide>(&query)
            .bind(id)
            .bind(sources)
            .bind(to.as_str())
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a slide. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM slides WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
