//! Outcome type for enrichment calls that never raise on upstream failure.

use crate::error::UpstreamError;

/// Result of one enrichment call.
///
/// Upstream failures are recovered into [`Enrichment::Unavailable`] rather
/// than propagated, so callers degrade to "unknown" data explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    /// Data was resolved (from cache or upstream).
    Ready(T),
    /// The input was absent, no request was issued.
    Skipped,
    /// The upstream failed or timed out.
    Unavailable(UpstreamError),
}

impl<T> Enrichment<T> {
    /// Converts into an `Option`, discarding why data is missing.
    pub fn ok(self) -> Option<T> {
        match self {
            Enrichment::Ready(value) => Some(value),
            Enrichment::Skipped | Enrichment::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Enrichment::Ready(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Enrichment::Unavailable(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Enrichment<U> {
        match self {
            Enrichment::Ready(value) => Enrichment::Ready(f(value)),
            Enrichment::Skipped => Enrichment::Skipped,
            Enrichment::Unavailable(error) => Enrichment::Unavailable(error),
        }
    }
}

impl<T: Default> Enrichment<T> {
    /// The empty value stands in for anything that is not `Ready`.
    pub fn unwrap_or_default(self) -> T {
        self.ok().unwrap_or_default()
    }
}

impl<T> From<Result<T, UpstreamError>> for Enrichment<T> {
    fn from(result: Result<T, UpstreamError>) -> Self {
        match result {
            Ok(value) => Enrichment::Ready(value),
            Err(error) => Enrichment::Unavailable(error),
        }
    }
}
