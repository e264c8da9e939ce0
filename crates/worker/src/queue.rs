//! In-process job queue: JSON envelopes on an unbounded mpsc channel.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::jobs::{JobEnvelope, SlideJob};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job queue is closed")]
    Closed,

    #[error("failed to encode job: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Producer handle. Cheap to clone; shared by handlers and the worker pool.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<String>,
}

/// Consumer end, shared by every worker in the pool.
pub type JobReceiver = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

impl JobQueue {
    /// Create a queue and the receiver its workers will share.
    pub fn channel() -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Arc::new(Mutex::new(rx)))
    }

    /// Queue a job for its first attempt. Returns the envelope id.
    pub fn enqueue(&self, job: SlideJob) -> Result<Uuid, QueueError> {
        let envelope = JobEnvelope::new(job);
        self.enqueue_envelope(&envelope)?;
        tracing::info!(
            job_id = %envelope.id,
            job = envelope.job.name(),
            slide_id = envelope.job.slide_id(),
            "Job enqueued"
        );
        Ok(envelope.id)
    }

    pub fn enqueue_envelope(&self, envelope: &JobEnvelope) -> Result<(), QueueError> {
        self.send_raw(envelope.encode()?)
    }

    /// Push an already-encoded payload.
    pub fn send_raw(&self, payload: String) -> Result<(), QueueError> {
        self.tx.send(payload).map_err(|_| QueueError::Closed)
    }
}
