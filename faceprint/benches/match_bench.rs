use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faceid_faceprint::{EmbeddingRepository, IdentityId, KvRepository, MatchConfig, MatchDecider};
use faceid_kv::MemoryStore;

fn random_unit_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut v = Vec::with_capacity(dim);
    let mut state = seed;
    for _ in 0..dim {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        v.push(((state >> 33) as f32) / (u32::MAX as f32) - 0.5);
    }
    let norm: f64 = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
    if norm > 0.0 {
        let s = (1.0 / norm) as f32;
        for x in &mut v {
            *x *= s;
        }
    }
    v
}

fn decider_with(n: usize, dim: usize) -> MatchDecider {
    let repo = Arc::new(KvRepository::new(Arc::new(MemoryStore::new()), "bench", dim));
    for i in 0..n {
        repo.insert(&IdentityId::new(format!("id{i:06}")), &random_unit_vec(dim, i as u64 + 1))
            .unwrap();
    }
    MatchDecider::new(MatchConfig { dim, threshold: 0.35 }, repo)
}

fn bench_best_match(c: &mut Criterion) {
    let dim = 512;
    let query = random_unit_vec(dim, 999_999);
    for n in [100, 1000] {
        let decider = decider_with(n, dim);
        c.bench_function(&format!("faceprint_best_match_512d_{n}"), |b| {
            b.iter(|| {
                let _ = black_box(decider.find_best_match(black_box(&query)));
            });
        });
    }
}

fn bench_find_duplicate_miss(c: &mut Criterion) {
    let dim = 512;
    let decider = decider_with(1000, dim);
    let query = random_unit_vec(dim, 424_242);

    // Random unit vectors in 512d are near-orthogonal, so this scans everything.
    c.bench_function("faceprint_find_duplicate_512d_1000_miss", |b| {
        b.iter(|| {
            let _ = black_box(decider.find_duplicate(black_box(&query)));
        });
    });
}

criterion_group!(benches, bench_best_match, bench_find_duplicate_miss);
criterion_main!(benches);
