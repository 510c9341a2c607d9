//! Concurrency and politeness limits for a crawl
//!
//! A counting semaphore caps how many pages are in flight; each unit of work
//! sleeps the politeness delay after a successful fetch while still holding
//! its permit, so the aggregate request rate stays near `concurrency / delay`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds concurrent page fetches and paces them
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    delay: Duration,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Maximum pages in flight (at least 1)
    /// * `delay` - Pause after each successful fetch
    pub fn new(concurrency: usize, delay: Duration) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            delay,
        }
    }

    /// Waits for a free fetch slot
    ///
    /// The slot is released when the returned permit is dropped. Returns None
    /// only if the semaphore was closed.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.semaphore.clone().acquire_owned().await.ok()
    }

    /// Sleeps the configured politeness delay; no-op when it is zero
    pub async fn politeness_delay(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Number of URLs to take from the frontier for the next batch
    ///
    /// Twice the concurrency, trimmed to the pages left under the ceiling.
    ///
    /// # Arguments
    ///
    /// * `remaining` - Pages left before the ceiling, or None without a ceiling
    pub fn batch_size(&self, remaining: Option<usize>) -> usize {
        let size = self.concurrency * 2;
        match remaining {
            Some(remaining) => size.min(remaining),
            None => size,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
