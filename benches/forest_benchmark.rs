use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oncoforest::api::RandomForest;
use oncoforest::core::{Label, Sample};
use oncoforest::TabularDataset;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_patients(n_rows: usize, seed: u64) -> Vec<Sample> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (0..n_rows)
        .map(|_| {
            let age = rng.gen_range(20.0..80.0);
            let gender = rng.gen_range(0..2) as f64;
            let bmi = rng.gen_range(15.0..40.0);
            let smoking = rng.gen_range(0..2) as f64;
            let genetic = rng.gen_range(0..3) as f64;
            let activity = rng.gen_range(0.0..10.0);
            let alcohol = rng.gen_range(0.0..5.0);
            let history = rng.gen_range(0..2) as f64;

            let score = age / 40.0 + genetic + smoking + history - activity / 10.0
                + rng.gen::<f64>() * 0.5;
            let label = if score > 3.0 {
                Label::Positive
            } else {
                Label::Negative
            };

            Sample::new(
                [age, gender, bmi, smoking, genetic, activity, alcohol, history],
                label,
            )
        })
        .collect()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [300, 1200].iter() {
        let samples = create_patients(*n_rows, 1);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &samples, |b, samples| {
            b.iter(|| {
                RandomForest::new()
                    .with_n_trees(50)
                    .train_samples(black_box(samples))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let model = RandomForest::new()
        .train_samples(&create_patients(1200, 1))
        .unwrap();

    let single = create_patients(1, 2).remove(0);
    group.bench_function("single", |b| b.iter(|| model.predict(black_box(&single))));

    for n_rows in [100, 1000].iter() {
        let dataset = TabularDataset::from_samples(create_patients(*n_rows, 3)).unwrap();
        group.bench_with_input(BenchmarkId::new("evaluate", n_rows), &dataset, |b, data| {
            b.iter(|| model.evaluate_detailed(black_box(data)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
