use crate::error::Res;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound for a single wait between two attempts.
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Exponential backoff: `attempts` tries in total, waiting `base_delay`, then twice that, and so
/// on between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    attempts: u32,
    base_delay: Duration,
}

impl Backoff {
    /// `attempts` is clamped to at least one.
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The wait before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_DELAY)
    }

    /// Runs `op` until it succeeds or the attempts are used up, and returns the last error.
    /// `op` receives the 0-based attempt number.
    pub(crate) async fn retry<F, Fut, T>(&self, what: &str, mut op: F) -> Res<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Res<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.attempts {
                        return Err(e);
                    }
                    let delay = self.delay(attempt);
                    warn!(
                        "{what} failed (attempt {attempt} of {}), retrying in {delay:?}: {e:#}",
                        self.attempts
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
