use async_trait::async_trait;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use sqlx::PgPool;

use super::{SlideStore, StoreError};
use crate::models::slide::{CreateSlide, Slide};
use crate::repositories::SlideRepo;

/// [`SlideStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgSlideStore {
    pool: PgPool,
}

impl PgSlideStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SlideStore for PgSlideStore {
    async fn list(&self) -> Result<Vec<Slide>, StoreError> {
        Ok(SlideRepo::list(&self.pool).await?)
    }

    async fn find(&self, id: DbId) -> Result<Option<Slide>, StoreError> {
        Ok(SlideRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Slide>, StoreError> {
        Ok(SlideRepo::find_by_name(&self.pool, name).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Slide>, StoreError> {
        Ok(SlideRepo::find_by_slug(&self.pool, slug).await?)
    }

    async fn create(&self, input: &CreateSlide) -> Result<Slide, StoreError> {
        Ok(SlideRepo::create(&self.pool, input).await?)
    }

    async fn set_project_path(&self, id: DbId, path: &str) -> Result<Option<Slide>, StoreError> {
        Ok(SlideRepo::set_project_path(&self.pool, id, path).await?)
    }

    async fn transition(
        &self,
        id: DbId,
        from: &[SlideStatus],
        to: SlideStatus,
        error_message: Option<&str>,
    ) -> Result<Option<Slide>, StoreError> {
        Ok(SlideRepo::transition(&self.pool, id, from, to, error_message).await?)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(SlideRepo::delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
