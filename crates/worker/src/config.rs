use std::time::Duration;

use deckhand_core::config::{parse_env, ConfigError};

/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of jobs processed concurrently.
    pub concurrency: usize,
    /// Total attempts per job, including the first.
    pub max_attempts: u32,
    /// Pause before a failed job is re-enqueued.
    pub retry_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `WORKER_CONCURRENCY`   | `2`     |
    /// | `JOB_MAX_ATTEMPTS`     | `3`     |
    /// | `JOB_RETRY_DELAY_SECS` | `5`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let concurrency: usize = parse_env("WORKER_CONCURRENCY", defaults.concurrency, "usize")?;
        let max_attempts: u32 = parse_env("JOB_MAX_ATTEMPTS", defaults.max_attempts, "u32")?;
        let retry_delay_secs: u64 = parse_env("JOB_RETRY_DELAY_SECS", 5, "u64")?;

        Ok(Self {
            concurrency: concurrency.max(1),
            max_attempts: max_attempts.max(1),
            retry_delay: Duration::from_secs(retry_delay_secs),
        })
    }
}
