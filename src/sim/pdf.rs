//! Discrete probability distribution over a weight vector.
//!
//! The occupancy chain builds one of these fresh for every start-state and
//! transition draw; nothing holds a `DiscretePdf` across draws.

use rand::Rng;

use crate::error::{Error, Result};

/// A normalized discrete distribution supporting weighted index draws.
///
/// Construction clamps negative weights to zero and normalizes the rest so
/// they sum to one. An all-zero (or empty) weight vector is rejected:
/// normalization is undefined and callers must guarantee a positive sum.
#[derive(Debug, Clone)]
pub struct DiscretePdf {
    values: Vec<f64>,
}

impl DiscretePdf {
    /// Builds a distribution from raw weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDistribution`] if no weight is positive.
    pub fn new(weights: &[f64]) -> Result<Self> {
        let mut values: Vec<f64> = weights.iter().map(|w| w.max(0.0)).collect();
        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Err(Error::EmptyDistribution);
        }
        for v in &mut values {
            *v /= sum;
        }
        Ok(Self { values })
    }

    /// Normalized probabilities, in index order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Running-sum vector. The last entry equals one within floating
    /// tolerance.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut running = 0.0;
        self.values
            .iter()
            .map(|v| {
                running += v;
                running
            })
            .collect()
    }

    /// Draws a weighted random index.
    ///
    /// Returns the smallest index whose cumulative probability is at least
    /// the uniform draw. If floating error leaves the draw above every
    /// cumulative value, the last index is returned rather than running off
    /// the end.
    pub fn sample(&self, rng: &mut impl Rng) -> usize {
        let draw: f64 = rng.random();
        let cumulative = self.cumulative();
        for (i, c) in cumulative.iter().enumerate() {
            if draw <= *c {
                return i;
            }
        }
        self.values.len() - 1
    }
}
