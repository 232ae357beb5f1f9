#![allow(dead_code)]
use gcc_tdoa::F;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic white noise in `[-1, 1)`.
pub fn noise(len: usize, seed: u64) -> Vec<F> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Circularly delays `x` by `shift` samples, `out[i] = x[i - shift]`.
pub fn roll(x: &[F], shift: isize) -> Vec<F> {
    let n = x.len() as isize;
    (0..n)
        .map(|i| x[(i - shift).rem_euclid(n) as usize])
        .collect()
}
