use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, PlaybackError};

pub const DEFAULT_SPEED_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 60;
pub const DEFAULT_FALLBACK_STEP_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Route milliseconds per wall-clock millisecond.
    pub speed_multiplier: f64,
    /// Minimum wall-clock time between two accepted ticks.
    pub tick_interval_ms: u64,
    /// Jump from point to point instead of interpolating along segments.
    pub snap_to_points: bool,
    /// Spacing used when a route has to be given synthetic timestamps.
    pub fallback_step_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            snap_to_points: true,
            fallback_step_ms: DEFAULT_FALLBACK_STEP_MS,
        }
    }
}

impl PlaybackConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn validate(&self) -> Result<(), PlaybackError> {
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0) {
            return Err(PlaybackError::InvalidConfig(
                "speed multiplier must be a positive finite number",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "tick interval must be at least 1 ms",
            ));
        }
        if self.fallback_step_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "fallback step must be at least 1 ms",
            ));
        }
        Ok(())
    }

    /// Returns the updated configuration, or an error if any field of the
    /// result is out of bounds. `self` is left untouched either way.
    pub fn merged(&self, update: &ConfigUpdate) -> Result<Self, PlaybackError> {
        let merged = Self {
            speed_multiplier: update.speed_multiplier.unwrap_or(self.speed_multiplier),
            tick_interval_ms: update.tick_interval_ms.unwrap_or(self.tick_interval_ms),
            snap_to_points: update.snap_to_points.unwrap_or(self.snap_to_points),
            fallback_step_ms: update.fallback_step_ms.unwrap_or(self.fallback_step_ms),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Partial configuration change; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub speed_multiplier: Option<f64>,
    pub tick_interval_ms: Option<u64>,
    pub snap_to_points: Option<bool>,
    pub fallback_step_ms: Option<u64>,
}

impl ConfigUpdate {
    pub fn speed(speed_multiplier: f64) -> Self {
        Self {
            speed_multiplier: Some(speed_multiplier),
            ..Self::default()
        }
    }

    pub fn snap(snap_to_points: bool) -> Self {
        Self {
            snap_to_points: Some(snap_to_points),
            ..Self::default()
        }
    }
}
