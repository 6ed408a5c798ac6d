use std::{path::PathBuf, time::Duration};

use clap::Parser;
use playback::{
    gpx_io, loader, ConfigUpdate, HudView, PlaybackConfig, PlaybackEngine, SystemClock,
    TickOutcome,
};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Replay a recorded GPS route in real time")]
struct Args {
    /// Route file (.json array of points or .gpx). Falls back to $ROUTE_PATH,
    /// then to the embedded demo route.
    #[arg(long)]
    route: Option<PathBuf>,

    /// JSON playback configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playback speed multiplier (2.0 = twice real time)
    #[arg(long)]
    speed: Option<f64>,

    /// Minimum milliseconds between two samples
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Interpolate along segments instead of jumping from point to point
    #[arg(long)]
    smooth: bool,

    /// Spacing for routes recorded without timestamps
    #[arg(long)]
    point_step_ms: Option<u64>,

    /// Stop after this many accepted ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write the traveled path to this GPX file when playback stops
    #[arg(long)]
    export_gpx: Option<PathBuf>,
}

impl Args {
    fn config_update(&self) -> ConfigUpdate {
        ConfigUpdate {
            speed_multiplier: self.speed,
            tick_interval_ms: self.tick_ms,
            snap_to_points: self.smooth.then_some(false),
            fallback_step_ms: self.point_step_ms,
        }
    }

    fn route_path(&self) -> Option<PathBuf> {
        self.route
            .clone()
            .or_else(|| std::env::var_os("ROUTE_PATH").map(PathBuf::from))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => PlaybackConfig::from_file(path)?,
        None => PlaybackConfig::default(),
    };
    let config = base.merged(&args.config_update())?;

    let raw = loader::load_or_embedded(args.route_path().as_deref());
    let mut engine = PlaybackEngine::with_config(SystemClock::new(), config)?;
    engine.load_raw(&raw);

    if let Some(meta) = engine.route().metadata() {
        tracing::info!(
            "route: {} points, {:.0} m, {:.1} s at {}x, {} mode",
            meta.point_count,
            meta.distance_m,
            meta.duration_ms as f64 / 1000.0,
            config.speed_multiplier,
            if config.snap_to_points { "snap" } else { "smooth" }
        );
    }

    engine.play();

    // Poll at twice the sampling rate; the engine throttles the surplus.
    let mut interval =
        tokio::time::interval(Duration::from_millis((config.tick_interval_ms / 2).max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut accepted = 0u64;
    let mut last_segment = None;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                engine.pause();
                break;
            }
        }

        let outcome = engine.tick_now();
        if matches!(outcome, TickOutcome::Inactive) {
            break;
        }
        if matches!(outcome, TickOutcome::Throttled) {
            continue;
        }

        accepted += 1;
        if let Some(view) = HudView::project(&engine) {
            if last_segment != Some(view.segment_index) || outcome == TickOutcome::Finished {
                tracing::info!("{view}");
                last_segment = Some(view.segment_index);
            } else {
                tracing::debug!("{view}");
            }
        }

        if outcome == TickOutcome::Finished {
            tracing::info!("playback finished after {accepted} ticks");
            break;
        }
        if args.max_ticks.is_some_and(|max| accepted >= max) {
            tracing::info!("stopping after {accepted} ticks");
            engine.pause();
            break;
        }
    }

    if let Some(path) = &args.export_gpx {
        let bytes = gpx_io::encode_path_as_gpx(engine.traveled_path())?;
        std::fs::write(path, bytes)?;
        tracing::info!(
            "wrote {} traveled points to {:?}",
            engine.traveled_path().len(),
            path
        );
    }

    Ok(())
}
