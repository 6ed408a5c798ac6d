//! Replays recorded GPS routes: a tick-driven engine that turns a timestamped
//! point list into positions, headings, speeds and a traveled path.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod gpx_io;
pub mod hud;
pub mod loader;
pub mod route;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigUpdate, PlaybackConfig};
pub use engine::{Phase, PlaybackEngine, TickOutcome};
pub use error::{LoadError, PlaybackError, RouteError};
pub use hud::HudView;
pub use route::Route;
pub use shared::{GeoPoint, RawPoint, RouteMetadata, RoutePoint, Sample};
