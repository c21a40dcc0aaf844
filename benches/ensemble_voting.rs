//! Benchmarks for the canonical-key serializer and the voting pass.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use soar::domain::models::{CandidateOutput, CanonicalValue};
use soar::services::{ensemble_vote, normalize_output_key};

fn grid_output(seed: i64) -> CanonicalValue {
    let rows: Vec<CanonicalValue> = (0..10)
        .map(|r| CanonicalValue::from((0..10).map(|c| (seed + r * 10 + c) % 7).collect::<Vec<i64>>()))
        .collect();
    let mut object = BTreeMap::new();
    object.insert("grid".to_string(), CanonicalValue::Array(rows));
    object.insert("label".to_string(), CanonicalValue::from(format!("case-{seed}")));
    CanonicalValue::Object(object)
}

fn candidates(n: i64, distinct: i64) -> Vec<CandidateOutput> {
    (0..n)
        .map(|i| CandidateOutput {
            output: grid_output(i % distinct),
            program: format!("fn solve(input) {{ transform_{i}(input) }}"),
            training_accuracy: 0.1 + 0.8 * ((i % 10) as f64 / 10.0),
        })
        .collect()
}

fn bench_canonical_key(c: &mut Criterion) {
    let output = grid_output(3);
    c.bench_function("canonical_key_10x10_grid", |bench| {
        bench.iter(|| black_box(normalize_output_key(&output)))
    });
}

fn bench_vote_small(c: &mut Criterion) {
    let pool = candidates(16, 4);
    c.bench_function("ensemble_vote_16_ballots", |bench| {
        bench.iter(|| black_box(ensemble_vote(&pool)))
    });
}

fn bench_vote_large(c: &mut Criterion) {
    let pool = candidates(512, 32);
    c.bench_function("ensemble_vote_512_ballots", |bench| {
        bench.iter(|| black_box(ensemble_vote(&pool)))
    });
}

criterion_group!(
    benches,
    bench_canonical_key,
    bench_vote_small,
    bench_vote_large
);
criterion_main!(benches);
