use std::{cell::Cell, rc::Rc, time::Instant};

use chrono::Utc;

/// Time source for the playback engine.
pub trait Clock {
    /// Monotonic milliseconds; only differences are meaningful.
    fn now_ms(&self) -> f64;

    /// Wall-clock milliseconds since the Unix epoch, used to synthesize
    /// timestamps for routes recorded without them.
    fn epoch_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn epoch_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep a
/// handle and advance the clock an engine owns.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    epoch_base_ms: i64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
            epoch_base_ms: 0,
        }
    }

    pub fn with_epoch(mut self, epoch_base_ms: i64) -> Self {
        self.epoch_base_ms = epoch_base_ms;
        self
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn epoch_ms(&self) -> i64 {
        self.epoch_base_ms + self.now.get() as i64
    }
}
