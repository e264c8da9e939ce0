//! Fixed-size pool of tokio tasks draining the [`JobQueue`].

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::WorkerConfig;
use crate::jobs::JobEnvelope;
use crate::queue::{JobQueue, JobReceiver};
use crate::runner::{perform, JobContext};

/// Background job workers.
///
/// Each worker takes the next payload off the shared receiver, decodes it
/// and runs it. A retryable failure is re-enqueued after
/// [`WorkerConfig::retry_delay`] until [`WorkerConfig::max_attempts`] is
/// reached.
pub struct WorkerPool {
    ctx: JobContext,
    config: WorkerConfig,
    queue: JobQueue,
    receiver: JobReceiver,
}

/// What happened to one dequeued payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Retrying,
    Discarded,
    Exhausted,
}

impl WorkerPool {
    pub fn new(ctx: JobContext, config: WorkerConfig, queue: JobQueue, receiver: JobReceiver) -> Self {
        Self {
            ctx,
            config,
            queue,
            receiver,
        }
    }

    /// Spawn `concurrency` workers that run until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        tracing::info!(
            concurrency = self.config.concurrency,
            max_attempts = self.config.max_attempts,
            retry_delay_ms = self.config.retry_delay.as_millis() as u64,
            "Worker pool started",
        );

        (0..self.config.concurrency)
            .map(|worker| {
                let ctx = self.ctx.clone();
                let config = self.config.clone();
                let queue = self.queue.clone();
                let receiver = self.receiver.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    run_worker(worker, ctx, config, queue, receiver, cancel).await;
                })
            })
            .collect()
    }
}

async fn run_worker(
    worker: usize,
    ctx: JobContext,
    config: WorkerConfig,
    queue: JobQueue,
    receiver: JobReceiver,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(worker, "Worker shutting down");
                break;
            }
            payload = async { receiver.lock().await.recv().await } => payload,
        };

        let Some(payload) = next else {
            tracing::info!(worker, "Job queue closed; worker exiting");
            break;
        };

        handle_payload(&ctx, &config, &queue, &cancel, &payload).await;
    }
}

/// Decode and run one payload, scheduling a retry when appropriate.
pub async fn handle_payload(
    ctx: &JobContext,
    config: &WorkerConfig,
    queue: &JobQueue,
    cancel: &CancellationToken,
    payload: &str,
) -> Outcome {
    let envelope = match JobEnvelope::decode(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "Discarding job");
            return Outcome::Discarded;
        }
    };

    let job_id = envelope.id;
    let job = envelope.job.name();
    let slide_id = envelope.job.slide_id();
    let attempt = envelope.attempt;
    tracing::debug!(%job_id, job, slide_id, attempt, "Job started");

    let err = match perform(ctx, &envelope.job, attempt).await {
        Ok(()) => {
            tracing::info!(%job_id, job, slide_id, attempt, "Job completed");
            return Outcome::Completed;
        }
        Err(err) => err,
    };

    if !err.is_retryable() {
        tracing::warn!(%job_id, job, slide_id, error = %err, "Discarding job");
        return Outcome::Discarded;
    }
    if attempt >= config.max_attempts {
        tracing::error!(%job_id, job, slide_id, attempt, error = %err, "Job failed; no attempts left");
        return Outcome::Exhausted;
    }

    tracing::warn!(
        %job_id,
        job,
        slide_id,
        attempt,
        retry_in_ms = config.retry_delay.as_millis() as u64,
        error = %err,
        "Job failed; retrying",
    );
    schedule_retry(envelope.next_attempt(), config, queue.clone(), cancel.clone());
    Outcome::Retrying
}

fn schedule_retry(
    envelope: JobEnvelope,
    config: &WorkerConfig,
    queue: JobQueue,
    cancel: CancellationToken,
) {
    let delay = config.retry_delay;
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job_id = %envelope.id, "Retry dropped on shutdown");
            }
            _ = tokio::time::sleep(delay) => {
                if let Err(e) = queue.enqueue_envelope(&envelope) {
                    tracing::error!(job_id = %envelope.id, error = %e, "Could not re-enqueue job");
                }
            }
        }
    });
}
