use chrono::{DateTime, NaiveDateTime};

use shared::{GeoPoint, RawPoint, RoutePoint};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial forward-azimuth bearing from `a` to `b`, in `[0, 360)`.
///
/// For `a == b` the direction is meaningless; the current formula yields 0.
pub fn bearing_deg(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    // rem_euclid can return 360.0 for tiny negative inputs
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Straight lat/lon interpolation, not geodesic. Fine at segment scale.
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint {
        latitude: lerp(a.latitude, b.latitude, t),
        longitude: lerp(a.longitude, b.longitude, t),
    }
}

pub fn path_length_m(path: &[GeoPoint]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Offset-less timestamps are read as UTC.
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Assign a route time to every raw point.
///
/// All-or-nothing: recorded timestamps are used only when every point has
/// one that parses. Otherwise every point gets `now_ms + i * step_ms`.
pub fn normalize_timestamps(raw: &[RawPoint], now_ms: i64, step_ms: u64) -> Vec<RoutePoint> {
    let parsed: Option<Vec<i64>> = raw
        .iter()
        .map(|p| p.timestamp.as_deref().and_then(parse_timestamp_ms))
        .collect();

    match parsed {
        Some(times) => raw
            .iter()
            .zip(times)
            .map(|(p, t)| RoutePoint {
                position: p.position(),
                t,
            })
            .collect(),
        None => {
            tracing::debug!(
                points = raw.len(),
                step_ms,
                "route lacks complete timestamps, synthesizing uniform spacing"
            );
            let step = i64::try_from(step_ms).unwrap_or(i64::MAX);
            raw.iter()
                .enumerate()
                .map(|(i, p)| RoutePoint {
                    position: p.position(),
                    t: now_ms.saturating_add((i as i64).saturating_mul(step)),
                })
                .collect()
        }
    }
}
