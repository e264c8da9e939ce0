//! Background jobs for slide projects.
//!
//! Handlers enqueue a [`SlideJob`] on the [`JobQueue`]; a [`WorkerPool`]
//! of tokio tasks decodes each JSON envelope and runs it through
//! [`perform`], retrying failed attempts after a fixed delay and
//! discarding jobs that can never succeed.

pub mod config;
pub mod jobs;
pub mod pool;
pub mod queue;
pub mod runner;

pub use config::WorkerConfig;
pub use jobs::{JobEnvelope, JobError, SlideJob};
pub use pool::{handle_payload, Outcome, WorkerPool};
pub use queue::{JobQueue, JobReceiver, QueueError};
pub use runner::{perform, JobContext};
