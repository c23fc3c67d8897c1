//! Criterion benchmarks for the propose/commit pipeline.
//!
//! Uses random uniform city sets to measure round throughput per move
//! family and insertion commit strategy.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use u_tsp_anneal::anneal::{
    AnnealConfig, AnnealRunner, InsertionCommit, MoveFamily, RunnerConfig, SolverRound,
};
use u_tsp_anneal::geometry::CityTable;
use u_tsp_anneal::tour::Tour;

fn random_instance(n: usize, seed: u64) -> (CityTable, Tour) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
        .collect();
    let cities = CityTable::new(points).expect("valid instance");
    let tour = Tour::random(n, &mut rng).expect("valid tour");
    (cities, tour)
}

// ===========================================================================
// Single rounds
// ===========================================================================

fn bench_swap_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_round");
    group.sample_size(20);

    for &(n, grid) in &[(100usize, 256usize), (1_000, 1_024), (10_000, 4_096)] {
        let (cities, start) = random_instance(n, 42);
        let config = AnnealConfig::default().with_grid_size(grid).with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("n{}_g{}", n, grid), n),
            &(cities, start),
            |b, (cities, start)| {
                let mut round = SolverRound::new(config.clone()).expect("valid config");
                let mut tour = start.clone();
                b.iter(|| {
                    let outcome = round
                        .round(MoveFamily::Swap, black_box(cities), &mut tour, 0.5)
                        .expect("round");
                    black_box(outcome)
                })
            },
        );
    }
    group.finish();
}

fn bench_insertion_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion_round");
    group.sample_size(20);

    let (cities, start) = random_instance(5_000, 7);
    for strategy in [InsertionCommit::Snapshot, InsertionCommit::Serial] {
        let config = AnnealConfig::default()
            .with_grid_size(1_024)
            .with_insertion_commit(strategy)
            .with_seed(7);
        group.bench_function(format!("{strategy:?}"), |b| {
            let mut round = SolverRound::new(config.clone()).expect("valid config");
            let mut tour = start.clone();
            b.iter(|| {
                let outcome = round
                    .round(MoveFamily::Insertion, black_box(&cities), &mut tour, 0.5)
                    .expect("round");
                black_box(outcome)
            })
        });
    }
    group.finish();
}

fn bench_runner(c: &mut Criterion) {
    let mut group = c.benchmark_group("runner");
    group.sample_size(10);

    let (cities, start) = random_instance(200, 3);
    let anneal = AnnealConfig::default().with_grid_size(512).with_seed(3);
    let schedule = RunnerConfig::default()
        .with_initial_temperature(1.0)
        .with_min_temperature(0.01)
        .with_rounds_per_temperature(50)
        .with_max_rounds(2_000);
    group.bench_function("n200_r2000", |b| {
        b.iter(|| {
            let result = AnnealRunner::run(
                black_box(&cities),
                start.clone(),
                black_box(&anneal),
                black_box(&schedule),
            )
            .expect("run");
            black_box(result)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_swap_round, bench_insertion_commit, bench_runner);
criterion_main!(benches);
