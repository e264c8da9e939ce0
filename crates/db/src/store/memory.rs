use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use deckhand_core::slug::PENDING_PROJECT_PATH;
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use tokio::sync::RwLock;

use super::{SlideStore, StoreError};
use crate::models::slide::{CreateSlide, Slide};

/// In-process [`SlideStore`] with the same uniqueness and
/// compare-and-swap semantics as the Postgres store.
#[derive(Default)]
pub struct MemorySlideStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: DbId,
    rows: BTreeMap<DbId, Slide>,
}

impl MemorySlideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlideStore for MemorySlideStore {
    async fn list(&self) -> Result<Vec<Slide>, StoreError> {
        let inner = self.inner.read().await;
        let mut slides: Vec<Slide> = inner.rows.values().cloned().collect();
        slides.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(slides)
    }

    async fn find(&self, id: DbId) -> Result<Option<Slide>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Slide>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().find(|s| s.name == name).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Slide>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.values().find(|s| s.slug == slug).cloned())
    }

    async fn create(&self, input: &CreateSlide) -> Result<Slide, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.rows.values().any(|s| s.name == input.name) {
            return Err(StoreError::Duplicate { field: "Name" });
        }
        if inner.rows.values().any(|s| s.slug == input.slug) {
            return Err(StoreError::Duplicate { field: "Slug" });
        }

        inner.last_id += 1;
        let now = Utc::now();
        let slide = Slide {
            id: inner.last_id,
            name: input.name.clone(),
            slug: input.slug.clone(),
            project_path: PENDING_PROJECT_PATH.to_string(),
            status: SlideStatus::Pending,
            error_message: None,
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(slide.id, slide.clone());
        Ok(slide)
    }

    async fn set_project_path(&self, id: DbId, path: &str) -> Result<Option<Slide>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|slide| {
            slide.project_path = path.to_string();
            slide.updated_at = Utc::now();
            slide.clone()
        }))
    }

    async fn transition(
        &self,
        id: DbId,
        from: &[SlideStatus],
        to: SlideStatus,
        error_message: Option<&str>,
    ) -> Result<Option<Slide>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(slide) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if !from.contains(&slide.status) {
            return Ok(None);
        }
        slide.status = to;
        slide.error_message = error_message.map(str::to_string);
        slide.updated_at = Utc::now();
        Ok(Some(slide.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
