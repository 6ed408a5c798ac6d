use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use playback::{
    ManualClock, PlaybackConfig, PlaybackEngine, Route, RoutePoint, TickOutcome,
};

fn synthetic_route(points: usize) -> Route {
    let points = (0..points)
        .map(|i| {
            let f = i as f64;
            RoutePoint::new(45.93 + f * 1e-4, 4.57 + (f * 0.3).sin() * 1e-4, i as i64 * 1000)
        })
        .collect();
    Route::from_points(points).expect("monotonic route")
}

fn benchmark_full_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_replay");

    for (name, snap) in [("snap", true), ("smooth", false)] {
        for points in [100usize, 1_000] {
            let route = synthetic_route(points);
            group.bench_with_input(
                BenchmarkId::new(name, points),
                &route,
                |b, route| {
                    b.iter(|| {
                        let config = PlaybackConfig {
                            snap_to_points: snap,
                            tick_interval_ms: 1,
                            ..PlaybackConfig::default()
                        };
                        let mut engine =
                            PlaybackEngine::with_config(ManualClock::new(0.0), config).unwrap();
                        engine.load(route.clone());
                        engine.play();
                        let mut now = 0.0;
                        while engine.tick(black_box(now)) != TickOutcome::Inactive {
                            now += 50.0;
                        }
                        engine.traveled_path().len()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_replay);
criterion_main!(benches);
