//! Retry utilities: backoff builders and conflict-only retry.
//!
//! Uses `backon` for exponential backoff with jitter. Only version conflicts
//! are retried here: a conflict means nothing was written, so re-reading and
//! re-applying the caller's intent is safe. Every other storage failure is
//! returned untouched, because a blind retry could apply credits twice.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use tracing::warn;

use crate::interfaces::StorageError;

/// Backoff settings for optimistic-concurrency retries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConflictRetryConfig {
    /// Delay before the first retry.
    pub min_delay_ms: u64,
    /// Delay cap.
    pub max_delay_ms: u64,
    /// Maximum retries after the first attempt.
    pub max_times: usize,
    /// Randomize delays so contending writers spread out.
    pub jitter: bool,
}

impl Default for ConflictRetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 10,
            max_delay_ms: 2000,
            max_times: 10,
            jitter: true,
        }
    }
}

impl ConflictRetryConfig {
    /// Build the backoff policy.
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.min_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_max_times(self.max_times);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Run `attempt` until it succeeds, fails with something other than a
/// version conflict, or the backoff is exhausted.
///
/// Each attempt must re-read the entity it writes.
pub async fn retry_on_conflict<T, F, Fut>(
    operation: &str,
    backoff: ExponentialBuilder,
    attempt: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    attempt
        .retry(backoff)
        .when(StorageError::is_conflict)
        .notify(|err: &StorageError, delay: Duration| {
            warn!(operation, ?delay, "Retrying after {}", err);
        })
        .await
}
