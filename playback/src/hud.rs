use std::fmt;

use chrono::{DateTime, SecondsFormat};
use shared::Sample;

use crate::{
    clock::Clock,
    engine::{Phase, PlaybackEngine},
    geo::path_length_m,
};

/// Read-only snapshot of what a heads-up display shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudView {
    pub sample: Sample,
    pub phase: Phase,
    pub segment_index: usize,
    pub segment_count: usize,
    pub traveled_m: f64,
}

impl HudView {
    /// `None` until a non-empty route is loaded.
    pub fn project<C: Clock>(engine: &PlaybackEngine<C>) -> Option<Self> {
        let sample = *engine.current_sample()?;
        Some(Self {
            sample,
            phase: engine.phase(),
            segment_index: engine.segment_index(),
            segment_count: engine.route().segment_count(),
            traveled_m: path_length_m(engine.traveled_path()),
        })
    }

    pub fn speed_kmh(&self) -> f64 {
        self.sample.speed_mps * 3.6
    }
}

impl fmt::Display for HudView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = DateTime::from_timestamp_millis(self.sample.timestamp_ms)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| "–".to_string());
        write!(
            f,
            "{:.6}, {:.6} | heading {:.1}° | {} | {:.2} m/s ({:.1} km/h) | segment {}/{} | {:.0} m traveled",
            self.sample.position.latitude,
            self.sample.position.longitude,
            self.sample.heading_degrees,
            ts,
            self.sample.speed_mps,
            self.speed_kmh(),
            self.segment_index,
            self.segment_count,
            self.traveled_m,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, route::Route};
    use shared::RoutePoint;

    #[test]
    fn test_no_view_without_route() {
        let engine = PlaybackEngine::new(ManualClock::new(0.0));
        assert!(HudView::project(&engine).is_none());
    }

    #[test]
    fn test_view_tracks_engine() {
        let mut engine = PlaybackEngine::new(ManualClock::new(0.0));
        engine.load(
            Route::from_points(vec![
                RoutePoint::new(0.0, 0.0, 0),
                RoutePoint::new(0.0, 1.0, 1000),
                RoutePoint::new(0.0, 2.0, 2000),
            ])
            .unwrap(),
        );
        engine.play();
        engine.tick(1000.0);

        let view = HudView::project(&engine).unwrap();
        assert_eq!(view.phase, Phase::Playing);
        assert_eq!(view.segment_index, 1);
        assert_eq!(view.segment_count, 2);
        assert!((view.traveled_m - 111_194.93).abs() < 1.0);
        assert!((view.speed_kmh() - view.sample.speed_mps * 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_display_formats_fixed_precision() {
        let view = HudView {
            sample: Sample {
                position: shared::GeoPoint::new(17.385044, 78.486671),
                heading_degrees: 45.0,
                timestamp_ms: 1_721_469_600_000,
                speed_mps: 10.0,
            },
            phase: Phase::Playing,
            segment_index: 0,
            segment_count: 11,
            traveled_m: 0.0,
        };
        let text = view.to_string();
        assert!(text.starts_with("17.385044, 78.486671 | heading 45.0"));
        assert!(text.contains("2024-07-20T10:00:00.000Z"));
        assert!(text.contains("10.00 m/s (36.0 km/h)"));
        assert!(text.contains("segment 0/11"));
    }
}
