//! Fixed-interval request throttle
//!
//! The unauthenticated profile API allows a small number of requests per hour.
//! The throttle spaces consecutive request starts by a minimum interval,
//! whether the previous request succeeded or not.

use std::time::Duration;
use tokio::time::Instant;

/// Spaces consecutive requests by a minimum interval
#[derive(Debug, Clone)]
pub struct Throttle {
    /// Minimum time between the starts of two requests
    min_interval: Duration,

    /// When the last request was let through
    last_request: Option<Instant>,
}

impl Throttle {
    /// Creates a throttle that has not let any request through yet
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Calculates the time until the next request may start
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// Waits until a request may start and records it
    pub async fn wait_turn(&mut self) {
        if let Some(wait) = self.time_until_ready(Instant::now()) {
            tracing::trace!("Throttling next request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// Forgets the last request, so the next one starts immediately
    pub fn reset(&mut self) {
        self.last_request = None;
    }
}
