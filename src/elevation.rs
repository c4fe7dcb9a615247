//! Elevation profiles along a driven path.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::enrichment::Enrichment;
use crate::error::UpstreamError;
use crate::geo;
use crate::health::{ApiHealth, ApiSource};
use crate::models::{Coordinate, ElevationSample, ElevationStats};

/// Upper bound on points sent in one lookup
pub const DEFAULT_MAX_SAMPLES: usize = 100;

/// One point returned by the elevation service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct ElevationPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

#[async_trait]
pub trait ElevationSource: Send + Sync {
    /// Batched lookup; results are in input order.
    async fn lookup(&self, points: &[Coordinate]) -> Result<Vec<ElevationPoint>, UpstreamError>;

    async fn lookup_one(&self, point: Coordinate) -> Result<Option<f64>, UpstreamError>;
}

pub struct ElevationProfiler {
    source: Arc<dyn ElevationSource>,
    health: Arc<ApiHealth>,
}

impl ElevationProfiler {
    pub fn new(source: Arc<dyn ElevationSource>, health: Arc<ApiHealth>) -> Self {
        Self { source, health }
    }

    /// Downsample, fetch elevations in one request and attach cumulative distances.
    pub async fn build_profile(
        &self,
        points: &[Coordinate],
        max_samples: usize,
    ) -> Enrichment<Vec<ElevationSample>> {
        if points.is_empty() {
            return Enrichment::Skipped;
        }

        let sampled = sample_points(points, max_samples);
        let results = match self.source.lookup(&sampled).await {
            Ok(results) => {
                self.health.record(ApiSource::Elevation, true);
                results
            }
            Err(err) => {
                self.health.record(ApiSource::Elevation, false);
                tracing::warn!(samples = sampled.len(), error = %err, "elevation lookup failed");
                return Enrichment::Unavailable(err);
            }
        };

        let distances = geo::cumulative_distances(&sampled);
        let profile = sampled
            .iter()
            .zip(results)
            .zip(distances)
            .enumerate()
            .map(|(index, ((point, result), distance))| ElevationSample {
                latitude: result.latitude.unwrap_or(point.latitude),
                longitude: result.longitude.unwrap_or(point.longitude),
                elevation: result.elevation,
                index,
                distance_from_start: distance.round(),
            })
            .collect();
        Enrichment::Ready(profile)
    }

    /// Elevation of a single position
    pub async fn elevation_at(&self, point: Coordinate) -> Enrichment<f64> {
        if point.is_absent() {
            return Enrichment::Skipped;
        }
        match self.source.lookup_one(point).await {
            Ok(Some(elevation)) => {
                self.health.record(ApiSource::Elevation, true);
                Enrichment::Ready(elevation)
            }
            Ok(None) => {
                self.health.record(ApiSource::Elevation, true);
                Enrichment::Skipped
            }
            Err(err) => {
                self.health.record(ApiSource::Elevation, false);
                tracing::warn!(error = %err, "elevation lookup failed");
                Enrichment::Unavailable(err)
            }
        }
    }
}

/// Keep every `ceil(n / max_samples)`-th point, always ending on the last one.
#[must_use]
pub fn sample_points(points: &[Coordinate], max_samples: usize) -> Vec<Coordinate> {
    let n = points.len();
    if n <= max_samples || max_samples == 0 {
        return points.to_vec();
    }

    let step = n.div_ceil(max_samples);
    let mut sampled: Vec<Coordinate> = points.iter().step_by(step).copied().collect();
    if (n - 1) % step != 0 {
        sampled.push(points[n - 1]);
    }
    sampled
}

/// Aggregate statistics; `None` when there is no elevation data at all.
#[must_use]
pub fn compute_stats(profile: &[ElevationSample]) -> Option<ElevationStats> {
    let elevations: Vec<f64> = profile.iter().filter_map(|s| s.elevation).collect();
    let (&first, &last) = (elevations.first()?, elevations.last()?);

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut ascent = 0.0;
    let mut descent = 0.0;
    for (i, &elevation) in elevations.iter().enumerate() {
        min = min.min(elevation);
        max = max.max(elevation);
        if i > 0 {
            let delta = elevation - elevations[i - 1];
            if delta > 0.0 {
                ascent += delta;
            } else {
                descent -= delta;
            }
        }
    }
    let avg = elevations.iter().sum::<f64>() / elevations.len() as f64;

    #[allow(clippy::cast_possible_truncation)]
    let whole = |value: f64| value.round() as i64;
    Some(ElevationStats {
        min: whole(min),
        max: whole(max),
        start: whole(first),
        end: whole(last),
        total_ascent: whole(ascent),
        total_descent: whole(descent),
        avg: whole(avg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeElevation;

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(49.0 + i as f64 * 0.001, 16.0))
            .collect()
    }

    fn profile_of(elevations: &[Option<f64>]) -> Vec<ElevationSample> {
        elevations
            .iter()
            .enumerate()
            .map(|(index, &elevation)| ElevationSample {
                latitude: 49.0,
                longitude: 16.0,
                elevation,
                index,
                distance_from_start: index as f64 * 100.0,
            })
            .collect()
    }

    #[test]
    fn test_stats_of_known_profile() {
        let profile = profile_of(&[Some(200.0), Some(250.0), Some(230.0), Some(280.0), Some(240.0)]);
        let stats = compute_stats(&profile).unwrap();
        assert_eq!(stats.min, 200);
        assert_eq!(stats.max, 280);
        assert_eq!(stats.start, 200);
        assert_eq!(stats.end, 240);
        assert_eq!(stats.total_ascent, 100);
        assert_eq!(stats.total_descent, 60);
        assert_eq!(stats.avg, 240);
    }

    #[test]
    fn test_stats_skip_missing_elevations() {
        let profile = profile_of(&[None, Some(300.4), None, Some(310.6)]);
        let stats = compute_stats(&profile).unwrap();
        assert_eq!(stats.start, 300);
        assert_eq!(stats.end, 311);
        assert_eq!(stats.total_ascent, 10);
        assert_eq!(stats.total_descent, 0);
        let net = stats.total_ascent - stats.total_descent;
        assert!((net - (stats.end - stats.start)).abs() <= profile.len() as i64);
    }

    #[test]
    fn test_stats_absent_without_data() {
        assert!(compute_stats(&[]).is_none());
        assert!(compute_stats(&profile_of(&[None, None])).is_none());
    }

    #[test]
    fn test_sampling_keeps_short_paths() {
        let points = line(100);
        assert_eq!(sample_points(&points, 100), points);
    }

    #[test]
    fn test_sampling_forces_last_point() {
        // step 3 lands on index 249 by itself
        let points = line(250);
        let sampled = sample_points(&points, 100);
        assert_eq!(sampled.len(), 84);
        assert_eq!(sampled.first(), points.first());
        assert_eq!(sampled.last(), points.last());

        let points = line(251);
        let sampled = sample_points(&points, 100);
        assert_eq!(sampled.len(), 85);
        assert_eq!(sampled.last(), points.last());
        assert_eq!(sampled[83], points[249]);
    }

    #[tokio::test]
    async fn profile_has_monotonic_distances() {
        let source = Arc::new(FakeElevation::new());
        let profiler = ElevationProfiler::new(source.clone(), Arc::new(ApiHealth::new()));

        let profile = profiler.build_profile(&line(250), DEFAULT_MAX_SAMPLES).await;
        let profile = profile.unwrap_or_default();

        assert_eq!(profile.len(), 84);
        assert_eq!(source.batch_calls(), 1);
        assert_eq!(profile[0].distance_from_start, 0.0);
        assert!(profile.windows(2).all(|w| w[0].distance_from_start <= w[1].distance_from_start));
        assert!(profile.iter().enumerate().all(|(i, s)| s.index == i));
    }

    #[tokio::test]
    async fn failed_lookup_yields_empty_profile() {
        let source = Arc::new(FakeElevation::failing());
        let health = Arc::new(ApiHealth::new());
        let profiler = ElevationProfiler::new(source, health.clone());

        let outcome = profiler.build_profile(&line(10), DEFAULT_MAX_SAMPLES).await;
        assert!(outcome.is_unavailable());
        assert!(outcome.unwrap_or_default().is_empty());
        assert_eq!(health.status("elevation").unwrap().state.ok, Some(false));
    }

    #[tokio::test]
    async fn missing_profile_has_no_stats() {
        let failed = ElevationProfiler::new(Arc::new(FakeElevation::failing()), Arc::new(ApiHealth::new()));
        let unavailable = failed.build_profile(&line(10), DEFAULT_MAX_SAMPLES).await;
        assert!(compute_stats(&unavailable.unwrap_or_default()).is_none());

        let profiler = ElevationProfiler::new(Arc::new(FakeElevation::new()), Arc::new(ApiHealth::new()));
        let skipped = profiler.build_profile(&[], DEFAULT_MAX_SAMPLES).await;
        assert!(compute_stats(&skipped.unwrap_or_default()).is_none());
    }

    #[tokio::test]
    async fn empty_path_issues_no_request() {
        let source = Arc::new(FakeElevation::new());
        let profiler = ElevationProfiler::new(source.clone(), Arc::new(ApiHealth::new()));

        assert_eq!(profiler.build_profile(&[], 100).await, Enrichment::Skipped);
        assert_eq!(source.batch_calls(), 0);
    }

    #[tokio::test]
    async fn single_point_elevation() {
        let profiler = ElevationProfiler::new(Arc::new(FakeElevation::new()), Arc::new(ApiHealth::new()));
        assert!(profiler.elevation_at(Coordinate::new(49.2, 16.6)).await.is_ready());
        assert_eq!(profiler.elevation_at(Coordinate::new(0.0, 0.0)).await, Enrichment::Skipped);
    }
}
