use std::io;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route time decreases at point {index} ({previous} ms -> {current} ms)")]
    NonMonotonic {
        index: usize,
        previous: i64,
        current: i64,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("invalid playback configuration: {0}")]
    InvalidConfig(&'static str),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read route file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid route JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("unsupported route format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Route(#[from] RouteError),
}
