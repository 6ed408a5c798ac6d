use shared::{GeoPoint, RawPoint, RoutePoint, Sample};

use crate::{
    clock::{Clock, SystemClock},
    config::{ConfigUpdate, PlaybackConfig},
    error::PlaybackError,
    geo::{bearing_deg, haversine_m, interpolate},
    route::Route,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No route loaded yet.
    Idle,
    Ready,
    Playing,
    /// The last point has been reached; only `reset` or `load` leave this.
    Finished,
}

/// What a call to [`PlaybackEngine::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing happened.
    Inactive,
    /// Called again before `tick_interval_ms` elapsed.
    Throttled,
    /// A new sample was produced.
    Advanced,
    /// A new sample was produced and it is the last one.
    Finished,
}

#[derive(Debug, Clone, Default)]
struct PlaybackState {
    segment_index: usize,
    /// Wall-clock time at which the current route-time reference was taken.
    segment_start_wall_ms: f64,
    /// Route time corresponding to `segment_start_wall_ms`.
    segment_start_route_ms: f64,
    last_tick_ms: Option<f64>,
}

/// Replays a [`Route`] against a clock.
///
/// The engine never schedules anything itself: some outer loop (a frame
/// callback, a timer, a test) calls [`tick`](Self::tick) with monotonically
/// increasing wall-clock times, and the engine turns them into [`Sample`]s
/// and a growing traveled path.
///
/// # Time mapping
/// ```text
/// route_now = segment_start_route + (now - segment_start_wall) * speed
/// ```
/// Whenever a segment is completed, or playback is paused, resumed or
/// re-speeded, the pair `(segment_start_wall, segment_start_route)` is moved
/// to the present so only the current speed applies to future progress.
///
/// # Policies
/// - **Snap**: the vehicle sits on `A` until `route_now >= B.t`, then jumps
///   exactly onto `B`.
/// - **Smooth**: the vehicle is interpolated along `A -> B` by
///   `(route_now - A.t) / (B.t - A.t)`, clamped to `[0, 1]`.
///
/// Heading and speed are constant per segment under both policies.
pub struct PlaybackEngine<C: Clock = SystemClock> {
    clock: C,
    config: PlaybackConfig,
    route: Route,
    phase: Phase,
    state: PlaybackState,
    sample: Option<Sample>,
    traveled: Vec<GeoPoint>,
}

impl<C: Clock> PlaybackEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            config: PlaybackConfig::default(),
            route: Route::default(),
            phase: Phase::Idle,
            state: PlaybackState::default(),
            sample: None,
            traveled: Vec::new(),
        }
    }

    pub fn with_config(clock: C, config: PlaybackConfig) -> Result<Self, PlaybackError> {
        config.validate()?;
        let mut engine = Self::new(clock);
        engine.config = config;
        Ok(engine)
    }

    pub fn load(&mut self, route: Route) {
        tracing::debug!(
            points = route.len(),
            duration_ms = route.duration_ms(),
            "loading route"
        );
        self.route = route;
        self.rewind();
        self.phase = Phase::Ready;
    }

    /// Normalize and load raw points, synthesizing timestamps with the
    /// configured fallback step when the recording lacks them.
    pub fn load_raw(&mut self, raw: &[RawPoint]) {
        let route = Route::from_raw(raw, self.clock.epoch_ms(), self.config.fallback_step_ms);
        self.load(route);
    }

    pub fn play(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }
        match self.route.len() {
            0 => return,
            1 => {
                self.finish();
                return;
            }
            _ => {}
        }
        self.state.segment_start_wall_ms = self.clock.now_ms();
        self.phase = Phase::Playing;
        tracing::debug!(segment = self.state.segment_index, "playback started");
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.rebase(self.clock.now_ms());
        self.phase = Phase::Ready;
        tracing::debug!(segment = self.state.segment_index, "playback paused");
    }

    pub fn reset(&mut self) {
        if self.phase == Phase::Idle {
            return;
        }
        self.rewind();
        self.phase = Phase::Ready;
        tracing::debug!("playback reset");
    }

    /// Apply a partial configuration change.
    ///
    /// Invalid updates are rejected whole. A speed change during playback
    /// keeps the progress made at the previous speed.
    pub fn set_config(&mut self, update: ConfigUpdate) -> Result<(), PlaybackError> {
        let next = self.config.merged(&update)?;
        if self.phase == Phase::Playing && next.speed_multiplier != self.config.speed_multiplier {
            self.rebase(self.clock.now_ms());
        }
        self.config = next;
        Ok(())
    }

    pub fn tick_now(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        self.tick(now)
    }

    pub fn tick(&mut self, now: f64) -> TickOutcome {
        if self.phase != Phase::Playing {
            return TickOutcome::Inactive;
        }
        if let Some(last) = self.state.last_tick_ms {
            if now - last < self.config.tick_interval_ms as f64 {
                return TickOutcome::Throttled;
            }
        }
        self.state.last_tick_ms = Some(now);

        let index = self.state.segment_index;
        let (a, b) = match (self.route.get(index), self.route.get(index + 1)) {
            (Some(a), Some(b)) => (*a, *b),
            _ => {
                self.finish();
                return TickOutcome::Finished;
            }
        };

        let duration_ms = (b.t - a.t).max(1);
        let route_now = self.route_time_at(now);
        let heading_degrees = bearing_deg(a.position, b.position);
        let speed_mps = haversine_m(a.position, b.position) / (duration_ms as f64 / 1000.0);

        let reached = if self.config.snap_to_points {
            let reached = route_now >= b.t as f64;
            let (position, timestamp_ms) = if reached {
                (b.position, b.t)
            } else {
                (a.position, a.t)
            };
            self.sample = Some(Sample {
                position,
                heading_degrees,
                timestamp_ms,
                speed_mps,
            });
            if reached {
                self.push_traveled(b.position);
            }
            reached
        } else {
            let t = ((route_now - a.t as f64) / duration_ms as f64).clamp(0.0, 1.0);
            let reached = t >= 1.0;
            let position = if reached {
                b.position
            } else {
                interpolate(a.position, b.position, t)
            };
            self.sample = Some(Sample {
                position,
                heading_degrees,
                timestamp_ms: a.t + (t * duration_ms as f64).round() as i64,
                speed_mps,
            });
            self.push_traveled(position);
            reached
        };

        if let Some(sample) = &self.sample {
            tracing::trace!(
                lat = sample.position.latitude,
                lon = sample.position.longitude,
                heading = sample.heading_degrees,
                ts = sample.timestamp_ms,
                "sample"
            );
        }

        if reached {
            self.advance_to(index + 1, b, now);
            if index + 2 >= self.route.len() {
                self.finish();
                return TickOutcome::Finished;
            }
        }
        TickOutcome::Advanced
    }

    pub fn current_sample(&self) -> Option<&Sample> {
        self.sample.as_ref()
    }

    pub fn traveled_path(&self) -> &[GeoPoint] {
        &self.traveled
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn segment_index(&self) -> usize {
        self.state.segment_index
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn route_time_at(&self, now: f64) -> f64 {
        let elapsed = (now - self.state.segment_start_wall_ms) * self.config.speed_multiplier;
        self.state.segment_start_route_ms + elapsed
    }

    /// Move the time reference to `now` without changing route progress.
    fn rebase(&mut self, now: f64) {
        self.state.segment_start_route_ms = self.route_time_at(now);
        self.state.segment_start_wall_ms = now;
    }

    fn advance_to(&mut self, index: usize, point: RoutePoint, now: f64) {
        self.state.segment_index = index;
        self.state.segment_start_wall_ms = now;
        self.state.segment_start_route_ms = point.t as f64;
        tracing::debug!(segment = index, route_ms = point.t, "segment advanced");
    }

    fn push_traveled(&mut self, position: GeoPoint) {
        if self.traveled.last() != Some(&position) {
            self.traveled.push(position);
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        tracing::debug!(
            segment = self.state.segment_index,
            traveled_points = self.traveled.len(),
            "playback finished"
        );
    }

    fn rewind(&mut self) {
        self.state = PlaybackState::default();
        self.traveled.clear();
        self.sample = None;

        let Some(first) = self.route.get(0).copied() else {
            return;
        };
        self.state.segment_start_route_ms = first.t as f64;
        self.traveled.push(first.position);
        let heading_degrees = self
            .route
            .get(1)
            .map(|next| bearing_deg(first.position, next.position))
            .unwrap_or(0.0);
        self.sample = Some(Sample {
            position: first.position,
            heading_degrees,
            timestamp_ms: first.t,
            speed_mps: 0.0,
        });
    }
}
