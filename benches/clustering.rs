use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glom::cluster::{Clustering, Dbscan, Kmeans};
use rand::prelude::*;

fn synthetic_data(n: usize, d: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| (0..d).map(|_| rng.random::<f32>()).collect())
        .collect()
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    let data = synthetic_data(1000, 16);

    group.bench_function("fit_predict_n1000_d16_k10", |b| {
        b.iter(|| {
            let model = Kmeans::new(10).with_max_iter(10).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

fn bench_dbscan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dbscan");

    let data = synthetic_data(500, 16);

    group.bench_function("fit_n500_d16", |b| {
        b.iter(|| {
            let model = Dbscan::new(0.5, 5);
            model.fit(black_box(&data)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_kmeans, bench_dbscan);
criterion_main!(benches);
