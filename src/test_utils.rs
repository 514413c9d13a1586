//! Synthetic benchmark tables for tests.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{
    dataset::{Dataset, Record},
    fit::Plane,
};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draws a random plane and `n` points on it, with Gaussian noise of
/// standard deviation `sigma` added to the memory column.
///
/// The noise is always drawn, so two calls with equally seeded generators
/// and different `sigma` only differ in the noise scale.
pub fn random_plane(rng: &mut StdRng, n: usize, sigma: f64) -> (Plane, Dataset) {
    let plane = Plane::new(
        rng.random_range(-5.0..5.0),
        rng.random_range(-1e-3..1e-3),
        rng.random_range(-50.0..50.0),
    );
    let noise = Normal::new(0.0, 1.0).unwrap();

    let records = (0..n)
        .map(|_| {
            let height = rng.random_range(4.0..40.0);
            let num_entities = rng.random_range(1e3..1e6);
            let memory_mb = plane.predict(height, num_entities) + sigma * noise.sample(rng);
            Record::new(height, num_entities, memory_mb)
        })
        .collect();

    (plane, Dataset::new(records))
}
