use shared::{GeoPoint, RawPoint, RouteBounds, RouteMetadata, RoutePoint};

use crate::error::RouteError;
use crate::geo::{normalize_timestamps, path_length_m};

/// Ordered, timestamped route. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    points: Vec<RoutePoint>,
}

impl Route {
    /// Build a route from already-timestamped points.
    ///
    /// Equal consecutive times are allowed (instantaneous segments), decreasing
    /// ones are not.
    pub fn from_points(points: Vec<RoutePoint>) -> Result<Self, RouteError> {
        if let Some(index) = points.windows(2).position(|w| w[1].t < w[0].t) {
            return Err(RouteError::NonMonotonic {
                index: index + 1,
                previous: points[index].t,
                current: points[index + 1].t,
            });
        }
        Ok(Self { points })
    }

    /// Normalize raw points into a route; see [`normalize_timestamps`].
    ///
    /// Recorded timestamps may still run backwards, in which case the points
    /// are re-timed with `step_ms` spacing from their first recorded time.
    pub fn from_raw(raw: &[RawPoint], now_ms: i64, step_ms: u64) -> Self {
        let points = normalize_timestamps(raw, now_ms, step_ms);
        match Self::from_points(points) {
            Ok(route) => route,
            Err(err) => {
                tracing::warn!("{err}; re-timing route with uniform spacing");
                let start = raw
                    .first()
                    .and_then(|p| p.timestamp.as_deref())
                    .and_then(crate::geo::parse_timestamp_ms)
                    .unwrap_or(now_ms);
                let untimed: Vec<RawPoint> = raw
                    .iter()
                    .map(|p| RawPoint {
                        timestamp: None,
                        ..p.clone()
                    })
                    .collect();
                Self {
                    points: normalize_timestamps(&untimed, start, step_ms),
                }
            }
        }
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&RoutePoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn positions(&self) -> Vec<GeoPoint> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn duration_ms(&self) -> i64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0,
        }
    }

    pub fn metadata(&self) -> Option<RouteMetadata> {
        let first = self.points.first()?;
        let last = self.points.last()?;

        let bounds = self.points.iter().fold(
            RouteBounds {
                min_lat: f64::INFINITY,
                max_lat: f64::NEG_INFINITY,
                min_lon: f64::INFINITY,
                max_lon: f64::NEG_INFINITY,
            },
            |b, p| RouteBounds {
                min_lat: b.min_lat.min(p.position.latitude),
                max_lat: b.max_lat.max(p.position.latitude),
                min_lon: b.min_lon.min(p.position.longitude),
                max_lon: b.max_lon.max(p.position.longitude),
            },
        );

        Some(RouteMetadata {
            point_count: self.points.len(),
            bounds,
            start: first.position,
            end: last.position,
            distance_m: path_length_m(&self.positions()),
            duration_ms: self.duration_ms(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lat: f64, lon: f64, ts: Option<&str>) -> RawPoint {
        RawPoint {
            latitude: lat,
            longitude: lon,
            timestamp: ts.map(str::to_string),
        }
    }

    #[test]
    fn test_from_points_rejects_decreasing_time() {
        let err = Route::from_points(vec![
            RoutePoint::new(0.0, 0.0, 1000),
            RoutePoint::new(0.0, 1.0, 500),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RouteError::NonMonotonic {
                index: 1,
                previous: 1000,
                current: 500
            }
        );
    }

    #[test]
    fn test_from_points_allows_equal_times() {
        let route = Route::from_points(vec![
            RoutePoint::new(0.0, 0.0, 1000),
            RoutePoint::new(0.0, 1.0, 1000),
        ])
        .unwrap();
        assert_eq!(route.segment_count(), 1);
        assert_eq!(route.duration_ms(), 0);
    }

    #[test]
    fn test_from_raw_retimes_backwards_recordings() {
        let route = Route::from_raw(
            &[
                raw(0.0, 0.0, Some("1970-01-01T00:00:10Z")),
                raw(0.0, 1.0, Some("1970-01-01T00:00:05Z")),
            ],
            0,
            1000,
        );
        let times: Vec<i64> = route.points().iter().map(|p| p.t).collect();
        assert_eq!(times, vec![10_000, 11_000]);
    }

    #[test]
    fn test_empty_route_has_no_metadata() {
        let route = Route::default();
        assert!(route.is_empty());
        assert_eq!(route.segment_count(), 0);
        assert!(route.metadata().is_none());
    }

    #[test]
    fn test_metadata_summarizes_route() {
        let route = Route::from_points(vec![
            RoutePoint::new(1.0, 3.0, 0),
            RoutePoint::new(-1.0, 4.0, 2_000),
            RoutePoint::new(0.5, 2.0, 5_000),
        ])
        .unwrap();
        let meta = route.metadata().unwrap();
        assert_eq!(meta.point_count, 3);
        assert_eq!(meta.bounds.min_lat, -1.0);
        assert_eq!(meta.bounds.max_lat, 1.0);
        assert_eq!(meta.bounds.min_lon, 2.0);
        assert_eq!(meta.bounds.max_lon, 4.0);
        assert_eq!(meta.start, GeoPoint::new(1.0, 3.0));
        assert_eq!(meta.end, GeoPoint::new(0.5, 2.0));
        assert_eq!(meta.duration_ms, 5_000);
        assert!(meta.distance_m > 0.0);
    }
}
