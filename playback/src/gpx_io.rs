use std::io::Read;

use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use shared::{GeoPoint, RawPoint};

use crate::error::LoadError;

const CREATOR: &str = "route-playback";

/// Read every track point of a GPX document, falling back to its routes
/// when it has no tracks. Waypoint times are kept as ISO-8601 strings so the
/// usual timestamp normalization applies.
pub fn read_raw_points(reader: impl Read) -> Result<Vec<RawPoint>, LoadError> {
    let gpx = gpx::read(reader)?;

    let track_points: Vec<&Waypoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .collect();

    let waypoints = if track_points.is_empty() {
        gpx.routes.iter().flat_map(|route| route.points.iter()).collect()
    } else {
        track_points
    };

    Ok(waypoints.into_iter().map(to_raw_point).collect())
}

pub fn encode_path_as_gpx(path: &[GeoPoint]) -> Result<Vec<u8>, LoadError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some("traveled path".into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment.points.extend(path.iter().map(to_waypoint));
    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(buffer)
}

fn to_raw_point(waypoint: &Waypoint) -> RawPoint {
    let point = waypoint.point();
    RawPoint {
        latitude: point.y(),
        longitude: point.x(),
        timestamp: waypoint.time.as_ref().and_then(|time| time.format().ok()),
    }
}

fn to_waypoint(position: &GeoPoint) -> Waypoint {
    Waypoint::new(Point::new(position.longitude, position.latitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMED_TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="17.385044" lon="78.486671"><time>2024-07-20T10:00:00Z</time></trkpt>
      <trkpt lat="17.38545" lon="78.48711"><time>2024-07-20T10:00:05Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_reads_track_points_with_times() {
        let points = read_raw_points(TIMED_TRACK.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 17.385044);
        assert_eq!(points[0].longitude, 78.486671);

        let t0 = crate::geo::parse_timestamp_ms(points[0].timestamp.as_deref().unwrap()).unwrap();
        let t1 = crate::geo::parse_timestamp_ms(points[1].timestamp.as_deref().unwrap()).unwrap();
        assert_eq!(t1 - t0, 5000);
    }

    #[test]
    fn test_path_roundtrips_through_gpx() {
        let path = vec![GeoPoint::new(45.0, 5.0), GeoPoint::new(45.5, 5.5)];
        let bytes = encode_path_as_gpx(&path).unwrap();
        let points = read_raw_points(bytes.as_slice()).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].position(), GeoPoint::new(45.5, 5.5));
        assert!(points.iter().all(|p| p.timestamp.is_none()));
    }

    #[test]
    fn test_rejects_malformed_document() {
        assert!(matches!(
            read_raw_points("<gpx".as_bytes()),
            Err(LoadError::Gpx(_))
        ));
    }
}
