use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use geo::Point;
use trainhub::models::{TrainerLocation, TrainerProfile};
use trainhub::services::roster::rank_by_distance;

/// Trainers scattered on a grid around the Bay Area.
fn trainer_grid(n: usize) -> Vec<TrainerProfile> {
    (0..n)
        .map(|i| {
            let row = (i / 100) as f64;
            let col = (i % 100) as f64;
            TrainerProfile {
                name: format!("Trainer {}", i),
                trainer_id: format!("TR{}", 100_000 + i),
                location: TrainerLocation {
                    latitude: 37.0 + row * 0.01,
                    longitude: -122.5 + col * 0.01,
                    radius: 100.0,
                },
                ..Default::default()
            }
        })
        .collect()
}

fn benchmark_rank_by_distance(c: &mut Criterion) {
    let trainers = trainer_grid(10_000);
    let origin = Point::new(-122.1430, 37.4419);

    let mut group = c.benchmark_group("trainer_discovery");

    group.bench_function("10k_trainers_5km", |b| {
        b.iter(|| rank_by_distance(black_box(trainers.clone()), origin, 5_000.0))
    });

    group.bench_function("10k_trainers_50km", |b| {
        b.iter(|| rank_by_distance(black_box(trainers.clone()), origin, 50_000.0))
    });

    group.finish();
}

criterion_group!(benches, benchmark_rank_by_distance);
criterion_main!(benches);
