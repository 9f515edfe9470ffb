//! Backoff for Kubernetes API calls.
//!
//! Calls failing with a transient error (see
//! [`ClusterErrorKind`](super::ClusterErrorKind)) are retried
//! with doubling delays. Permanent errors are returned after the first attempt.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::ClusterApiError;

/// Retry schedule for one API call.
///
/// The delay before retry `n` (0-indexed) is `first * 2^n`, capped at `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Retries after the initial attempt.
    pub retries: u32,
    pub first: Duration,
    pub cap: Duration,
}

impl Backoff {
    /// Schedule used for calls made while a cascade is running: 500ms, 1s, 2s.
    ///
    /// Short enough that one unreachable deployment delays the rest of the
    /// cascade by a few seconds at most.
    pub const API: Self = Self {
        retries: 3,
        first: Duration::from_millis(500),
        cap: Duration::from_secs(5),
    };

    /// A single attempt.
    pub const NONE: Self = Self {
        retries: 0,
        first: Duration::ZERO,
        cap: Duration::ZERO,
    };

    pub fn delay(&self, retry: u32) -> Duration {
        self.first
            .saturating_mul(2u32.saturating_pow(retry))
            .min(self.cap)
    }

    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.retries).map(|retry| self.delay(retry))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::API
    }
}

/// Runs `call` until it succeeds, fails permanently, or `backoff` runs out.
///
/// The last error is returned unchanged.
pub async fn with_backoff<T, F, Fut>(backoff: Backoff, mut call: F) -> Result<T, ClusterApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClusterApiError>>,
{
    let mut delays = backoff.delays();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.kind.is_retriable() {
            return Err(err);
        }

        match delays.next() {
            Some(delay) => {
                debug!(attempts, ?delay, error = %err, "Transient API error, retrying");
                tokio::time::sleep(delay).await;
            }
            None => {
                if attempts > 1 {
                    warn!(attempts, error = %err, "Giving up on API call");
                }
                return Err(err);
            }
        }
    }
}
