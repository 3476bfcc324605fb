//! Path fusion benchmarks
//!
//! Benchmarks for the CPU-heavy parts of a merge:
//! - Full merge of a new path against a ready merger
//! - Smoothing spline fit on its own
//! - Nearest-sample lookup on both store backends
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use marga_fusion::merger::spline::{self, FitInput, FitParams, HeadingAnchor};
use marga_fusion::{
    ColumnTable, PathMerger, PathMergerConfig, PathSample, Point2D, PointSequence, Pose2D,
    RowTable, TrajectoryStore,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Gently curving path ahead of the vehicle, `n` points at 0.5 m spacing.
fn curved_path(n: usize) -> PointSequence {
    (0..n)
        .map(|i| {
            let s = i as f64 * 0.5;
            Point2D::new(s, 0.002 * s * s)
        })
        .collect()
}

/// Merger that has already seen one path.
fn ready_merger(n: usize) -> PathMerger {
    let mut merger = PathMerger::new(PathMergerConfig::default()).unwrap();
    merger
        .merge(&curved_path(n), Some(Pose2D::identity()), None)
        .unwrap();
    merger
}

fn trip_samples(rows: usize, path_len: usize) -> Vec<PathSample> {
    (0..rows)
        .map(|i| {
            let t = i as f64 * 0.1;
            PathSample::new(t, Pose2D::new(t, 0.0, 0.0), curved_path(path_len))
        })
        .collect()
}

// ============================================================================
// Merge
// ============================================================================

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    let pose = Pose2D::new(1.0, 0.02, 0.01);

    for n in [50, 100, 200] {
        let new_path = curved_path(n);
        group.bench_with_input(BenchmarkId::new("ready", n), &n, |b, &n| {
            b.iter_batched(
                || ready_merger(n),
                |mut merger| {
                    merger
                        .merge(black_box(&new_path), Some(pose), Some(pose))
                        .unwrap()
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// Spline Fit
// ============================================================================

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("spline");
    let params = FitParams {
        degree: 3,
        lambda_1: 0.5,
        lambda_2: 0.5,
        max_control_points: 60,
    };

    for n in [50, 150] {
        let points = curved_path(n);
        let input = FitInput {
            weights: vec![1.0; points.len()],
            anchor: Some(HeadingAnchor {
                index: n / 2,
                heading: 0.0,
            }),
            points,
        };
        group.bench_with_input(BenchmarkId::new("fit", n), &input, |b, input| {
            b.iter(|| spline::fit(black_box(input), &params).unwrap())
        });
    }

    group.finish();
}

// ============================================================================
// Store Lookup
// ============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let samples = trip_samples(2000, 100);
    let rows = RowTable::new(samples.clone());
    let columns = ColumnTable::from_samples(&samples);

    group.bench_function("nearest/rows", |b| {
        b.iter(|| rows.find_nearest_sample(black_box(123.45)).unwrap())
    });
    group.bench_function("nearest/columns", |b| {
        b.iter(|| columns.find_nearest_sample(black_box(123.45)).unwrap())
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_merge, bench_fit, bench_lookup);

criterion_main!(benches);
