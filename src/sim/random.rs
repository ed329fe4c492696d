//! Draw helpers on an injected random generator.
//!
//! All stochastic components take `&mut impl Rng` rather than owning a
//! generator, so a single seeded [`rand::rngs::StdRng`] threaded through the
//! run makes the whole simulation reproducible.

use rand::Rng;

/// Draws from `Normal(mean, std_dev)` via Box-Muller.
pub fn normal(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z0 * std_dev
}

/// Draws from `Normal(mean, std_dev)` and truncates toward zero, flooring at
/// zero. Rated powers and heater cycle lengths use this rule.
pub fn normal_trunc(rng: &mut impl Rng, mean: f64, std_dev: f64) -> u32 {
    normal(rng, mean, std_dev).max(0.0) as u32
}
