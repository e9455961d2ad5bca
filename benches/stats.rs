/// Benchmarks for statistical operations.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meteopanel::stats;

/// Deterministic series with non-trivial spread.
fn get_test_series(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| (i as f64 * 0.37).sin() * 4.0 + 20.0)
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    for size in [100, 1_000, 10_000, 100_000] {
        let values = get_test_series(size);
        c.bench_function(&format!("fit_normal({})", size), |b| {
            b.iter(|| stats::fit_normal(black_box(&values)).unwrap());
        });

        let paired: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| v * 0.5 + (i % 13) as f64)
            .collect();
        c.bench_function(&format!("standardize_and_fit({})", size), |b| {
            b.iter(|| stats::standardize_and_fit(black_box(&values), black_box(&paired)).unwrap());
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
