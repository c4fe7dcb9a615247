//! Token-bucket spacing for upstreams with strict usage policies.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Nominatim allows one request per second; keep a safety margin.
pub const NOMINATIM_MIN_SPACING: Duration = Duration::from_millis(1100);

/// One permit per `spacing`, burst of one. Clones share the same bucket.
#[derive(Clone)]
pub struct RequestSpacing {
    limiter: Arc<DefaultDirectRateLimiter>,
    spacing: Duration,
}

impl fmt::Debug for RequestSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpacing")
            .field("spacing", &self.spacing)
            .finish_non_exhaustive()
    }
}

impl RequestSpacing {
    #[must_use]
    pub fn new(spacing: Duration) -> Self {
        // A zero period is rejected by governor; fall back to one per second.
        let quota = Quota::with_period(spacing)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            spacing,
        }
    }

    /// Wait until the next upstream call is allowed.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl Default for RequestSpacing {
    fn default() -> Self {
        Self::new(NOMINATIM_MIN_SPACING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn first_permit_is_immediate() {
        let spacing = RequestSpacing::new(Duration::from_secs(5));
        let started = Instant::now();
        spacing.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn consecutive_permits_are_spaced() {
        let spacing = RequestSpacing::new(Duration::from_millis(200));
        let shared = spacing.clone();
        let started = Instant::now();
        spacing.acquire().await;
        shared.acquire().await;
        assert!(started.elapsed() >= Duration::from_millis(190));
    }
}
