//! Exponential backoff around page requests.
//!
//! The delay before retry `n` (1-based) is
//! ```text
//! delay = min(base_delay * 2^(n-1), max_delay) + random_jitter(0..=max_jitter)
//! ```
//! Only `next_page` is retried; filter and sort calls pass straight through.

use super::{Navigator, Page};
use crate::error::Result;
use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

pub struct RetryNavigator<N> {
    inner: N,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter: StdDuration,
}

impl<N> RetryNavigator<N>
where
    N: Navigator,
{
    /// Wrap `inner` so failed page requests are retried.
    ///
    /// # Arguments
    ///
    /// * `inner` - The navigator doing the real requests
    /// * `max_retries` - Retries after the first failure (0 disables)
    /// * `base_delay` - Delay before the first retry; doubles each time
    ///
    /// # Example
    ///
    /// ```ignore
    /// let navigator = RetryNavigator::new(ApNewsNavigator::new(&config)?, 1, Duration::from_secs(1));
    /// ```
    pub fn new(inner: N, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    #[cfg(test)]
    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    #[cfg(test)]
    pub fn into_inner(self) -> N {
        self.inner
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(31);
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        delay + StdDuration::from_millis(rng().random_range(0..=jitter_ms))
    }
}

impl<N> fmt::Debug for RetryNavigator<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryNavigator")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<N> Navigator for RetryNavigator<N>
where
    N: Navigator,
{
    async fn apply_category_filter(&mut self, category: &str) -> Result<()> {
        self.inner.apply_category_filter(category).await
    }

    async fn sort_newest_first(&mut self) -> Result<()> {
        self.inner.sort_newest_first().await
    }

    #[instrument(level = "debug", skip_all)]
    async fn next_page(&mut self) -> Result<Page> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.next_page().await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "next_page() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "next_page() failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
