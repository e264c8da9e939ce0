//! Job payloads and the errors a job can end with.

use deckhand_core::project::{ServiceError, DEFAULT_INITIAL_CONTENT};
use deckhand_core::status::SlideStatus;
use deckhand_core::types::DbId;
use deckhand_db::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work that can be queued for a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideJob {
    /// Scaffold the project, write the initial source, then build it.
    CreateProject {
        slide_id: DbId,
        initial_content: String,
    },
    /// Rebuild an existing project.
    BuildProject { slide_id: DbId },
}

impl SlideJob {
    pub fn create(slide_id: DbId) -> Self {
        Self::CreateProject {
            slide_id,
            initial_content: DEFAULT_INITIAL_CONTENT.to_string(),
        }
    }

    pub fn build(slide_id: DbId) -> Self {
        Self::BuildProject { slide_id }
    }

    pub fn slide_id(&self) -> DbId {
        match self {
            Self::CreateProject { slide_id, .. } | Self::BuildProject { slide_id } => *slide_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateProject { .. } => "create_project",
            Self::BuildProject { .. } => "build_project",
        }
    }
}

/// The unit that travels through the queue, serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub id: Uuid,
    /// 1 for the first run, incremented on every retry.
    pub attempt: u32,
    pub job: SlideJob,
}

impl JobEnvelope {
    pub fn new(job: SlideJob) -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt: 1,
            job,
        }
    }

    /// The same job, one attempt later.
    pub fn next_attempt(&self) -> Self {
        Self {
            id: self.id,
            attempt: self.attempt + 1,
            job: self.job.clone(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(payload: &str) -> Result<Self, JobError> {
        serde_json::from_str(payload).map_err(JobError::Decode)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("undecodable job payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("slide {slide_id} no longer exists")]
    RecordMissing { slide_id: DbId },

    #[error("slide {slide_id} is {status}; job skipped")]
    InvalidState { slide_id: DbId, status: SlideStatus },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl JobError {
    /// Whether running the job again could succeed.
    ///
    /// Bad payloads, deleted records and records owned by another job are
    /// discarded; tool, filesystem and database failures are retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Store(_))
    }
}
