//! Generator construction and MDS checks

use cauchy256::reed_solomon::matrix::{GeneratorMatrix, MatrixCache, SquareMatrix};
use cauchy256::Gf256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[test]
fn generator_is_deterministic() {
    let field = Gf256::new().unwrap();
    let a = GeneratorMatrix::build(&field, 12, 4).unwrap();
    let b = GeneratorMatrix::build(&field, 12, 4).unwrap();
    assert_eq!(a, b);
}

#[test]
fn random_erasure_patterns_are_invertible_at_scale() {
    let field = Gf256::new().unwrap();
    let mut rng = StdRng::seed_from_u64(0xCA0C_4256);

    for _ in 0..200 {
        let k = rng.random_range(2..=200usize);
        let m = rng.random_range(1..=(256 - k).min(32));
        let generator = GeneratorMatrix::build(&field, k, m).unwrap();

        let erased_count = rng.random_range(1..=m.min(k));
        let mut erased = rand::seq::index::sample(&mut rng, k, erased_count).into_vec();
        erased.sort_unstable();
        let rows = rand::seq::index::sample(&mut rng, m, erased_count).into_vec();

        let sub = generator.submatrix(&rows, &erased);
        let inverse = sub
            .invert(&field)
            .unwrap_or_else(|e| panic!("k={} m={} rows={:?}: {}", k, m, rows, e));
        assert_eq!(sub.mul(&field, &inverse), SquareMatrix::identity(erased_count));
    }
}

#[test]
fn full_recovery_square_for_max_code() {
    // 128 originals all lost, 128 recovery rows
    let field = Gf256::new().unwrap();
    let generator = GeneratorMatrix::build(&field, 128, 128).unwrap();
    let all: Vec<usize> = (0..128).collect();

    let sub = generator.submatrix(&all, &all);

    assert!(sub.is_invertible(&field));
}

#[test]
fn cache_under_concurrent_first_use() {
    use rayon::prelude::*;

    let field = Gf256::new().unwrap();
    let cache = MatrixCache::new();

    let generators: Vec<Arc<GeneratorMatrix>> = (0..64)
        .into_par_iter()
        .map(|_| cache.get_or_build(&field, 20, 5).unwrap())
        .collect();

    assert_eq!(cache.len(), 1);
    assert!(generators.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}
