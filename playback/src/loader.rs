use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use shared::RawPoint;

use crate::{error::LoadError, gpx_io};

/// Default route, used whenever no route file can be read.
const EMBEDDED_ROUTE: [(f64, f64, &str); 12] = [
    (17.385044, 78.486671, "2024-07-20T10:00:00Z"),
    (17.38545, 78.48711, "2024-07-20T10:00:05Z"),
    (17.38582, 78.48788, "2024-07-20T10:00:12Z"),
    (17.38612, 78.48863, "2024-07-20T10:00:18Z"),
    (17.38658, 78.48921, "2024-07-20T10:00:26Z"),
    (17.38714, 78.48972, "2024-07-20T10:00:33Z"),
    (17.38772, 78.49010, "2024-07-20T10:00:40Z"),
    (17.38822, 78.49052, "2024-07-20T10:00:47Z"),
    (17.38879, 78.49101, "2024-07-20T10:00:54Z"),
    (17.38933, 78.49148, "2024-07-20T10:01:00Z"),
    (17.38991, 78.49192, "2024-07-20T10:01:07Z"),
    (17.39042, 78.49242, "2024-07-20T10:01:15Z"),
];

pub fn embedded_points() -> Vec<RawPoint> {
    EMBEDDED_ROUTE
        .iter()
        .map(|&(latitude, longitude, timestamp)| RawPoint {
            latitude,
            longitude,
            timestamp: Some(timestamp.to_string()),
        })
        .collect()
}

/// JSON array of `{latitude, longitude, timestamp?}` objects.
pub fn read_json_points(reader: impl Read) -> Result<Vec<RawPoint>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read raw points from a `.json` or `.gpx` file.
pub fn load_raw_points(path: impl AsRef<Path>) -> Result<Vec<RawPoint>, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let reader = || -> Result<BufReader<File>, LoadError> { Ok(BufReader::new(File::open(path)?)) };

    match extension.as_str() {
        "json" => read_json_points(reader()?),
        "gpx" => gpx_io::read_raw_points(reader()?),
        other => Err(LoadError::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}

/// Load the route at `path`, or the embedded route if there is no path, the
/// file can't be read, or it holds no points.
pub fn load_or_embedded(path: Option<&Path>) -> Vec<RawPoint> {
    let Some(path) = path else {
        tracing::info!("no route file given, using embedded route");
        return embedded_points();
    };

    match load_raw_points(path) {
        Ok(points) if !points.is_empty() => {
            tracing::info!("loaded {} points from {}", points.len(), path.display());
            points
        }
        Ok(_) => {
            tracing::warn!("{} holds no points, using embedded route", path.display());
            embedded_points()
        }
        Err(err) => {
            tracing::warn!("failed to load {}: {err}, using embedded route", path.display());
            embedded_points()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_embedded_route_is_fully_timestamped() {
        let points = embedded_points();
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.timestamp.is_some()));
    }

    #[test]
    fn test_json_points_with_optional_timestamps() {
        let json = r#"[
            {"latitude": 1.0, "longitude": 2.0, "timestamp": "2024-07-20T10:00:00Z"},
            {"latitude": 1.5, "longitude": 2.5},
            {"latitude": 2.0, "longitude": 3.0, "timestamp": null}
        ]"#;
        let points = read_json_points(json.as_bytes()).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points[0].timestamp.is_some());
        assert!(points[1].timestamp.is_none());
        assert!(points[2].timestamp.is_none());
    }

    #[test]
    fn test_load_raw_points_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"latitude": 1.0, "longitude": 2.0}}]"#).unwrap();

        let points = load_raw_points(file.path()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].latitude, 1.0);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(matches!(
            load_raw_points(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == ".csv"
        ));
    }

    #[test]
    fn test_fallback_to_embedded_route() {
        assert_eq!(load_or_embedded(None).len(), 12);
        assert_eq!(
            load_or_embedded(Some(Path::new("/definitely/missing/route.json"))).len(),
            12
        );

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[]").unwrap();
        assert_eq!(load_or_embedded(Some(file.path())).len(), 12);

        let mut broken = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(broken, "{{ not json").unwrap();
        assert_eq!(load_or_embedded(Some(broken.path())).len(), 12);
    }
}
