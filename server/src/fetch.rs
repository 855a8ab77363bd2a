//! Read path with a bounded retry.
//!
//! Every backend read goes through `fetch_with_retry`: one attempt, then up to
//! `max_retries` more after a fixed backoff, each attempt bounded by
//! `attempt_timeout`. Dropping the returned future abandons the in-flight
//! request and any pending backoff.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Which attempt produced the surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Fetch,
    Retry,
}

impl fmt::Display for FetchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSource::Fetch => f.write_str("Fetch"),
            FetchSource::Retry => f.write_str("Retry"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{source_tag}: {error}")]
pub struct FetchError {
    pub source_tag: FetchSource,
    pub attempts: u32,
    #[source]
    pub error: BackendError,
}

pub async fn fetch_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BackendError>>,
{
    let mut attempt: u32 = 0;

    loop {
        let result = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        };

        let error = match result {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(what, attempt, "Fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        let source_tag = if attempt == 0 {
            FetchSource::Fetch
        } else {
            FetchSource::Retry
        };

        if attempt >= policy.max_retries || !error.is_retryable() {
            tracing::warn!(what, attempts = attempt + 1, error = %error, "Fetch failed");
            return Err(FetchError {
                source_tag,
                attempts: attempt + 1,
                error,
            });
        }

        tracing::debug!(what, attempt, error = %error, "Fetch failed, retrying");
        attempt += 1;
        tokio::time::sleep(policy.backoff).await;
    }
}
