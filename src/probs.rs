//! Utilities for working with probabilities.

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::warn;

pub trait SliceExt {
    fn sum(&self) -> f64;
    fn normalise(&mut self, target: f64) -> f64;
    fn scale(&mut self, factor: f64);
}
impl SliceExt for [f64] {
    fn sum(&self) -> f64 {
        self.iter().sum()
    }

    fn normalise(&mut self, target: f64) -> f64 {
        let sum = self.sum();
        self.scale(target / sum);
        sum
    }

    fn scale(&mut self, factor: f64) {
        for element in self {
            *element *= factor;
        }
    }
}

/// How a vector of scores was turned into probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalisation {
    /// Scores were divided by their (strictly positive) sum.
    Simplex,

    /// The scores summed to zero or less and were passed through unchanged.
    Identity,
}

/// Rescales `scores` in place so that they sum to 1. If their sum is not strictly positive, the
/// scores are left untouched.
pub fn normalise_scores(scores: &mut [f64]) -> Normalisation {
    let sum = scores.sum();
    if sum > 0.0 {
        scores.normalise(1.0);
        Normalisation::Simplex
    } else {
        warn!("scores sum to {sum}; probabilities are left un-normalised");
        Normalisation::Identity
    }
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::testing::{assert_slice_f64_near, assert_slice_f64_relative};

    #[test]
    fn sum() {
        let data = [0.0, 0.1, 0.2];
        assert_f64_near!(0.3, data.sum(), 1);
    }

    #[test]
    fn normalise() {
        let mut data = [0.05, 0.1, 0.15, 0.2];
        let sum = data.normalise(1.0);
        assert_f64_near!(0.5, sum, 1);
        assert_slice_f64_near(&[0.1, 0.2, 0.3, 0.4], &data, 1);
    }

    #[test]
    fn normalise_scores_positive_sum() {
        let mut scores = [0.43, 0.185];
        assert_eq!(Normalisation::Simplex, normalise_scores(&mut scores));
        assert_slice_f64_relative(&[0.699187, 0.300813], &scores, 1e-5);
        assert_float_absolute_eq!(1.0, scores.sum(), 1e-9);
    }

    #[test]
    fn normalise_scores_preserves_order() {
        let original = [0.3, -0.05, 0.9, 0.12, 0.0, 0.44];
        let mut scores = original;
        assert_eq!(Normalisation::Simplex, normalise_scores(&mut scores));
        assert_float_absolute_eq!(1.0, scores.sum(), 1e-9);
        for i in 0..original.len() {
            for j in 0..original.len() {
                assert_eq!(
                    original[i].total_cmp(&original[j]),
                    scores[i].total_cmp(&scores[j]),
                    "order of {i} and {j}"
                );
            }
        }
    }

    #[test]
    fn normalise_scores_zero_sum_is_identity() {
        let mut scores = [0.0, 0.0, 0.0];
        assert_eq!(Normalisation::Identity, normalise_scores(&mut scores));
        assert_eq!([0.0, 0.0, 0.0], scores);

        let mut scores = [0.2, -0.2];
        assert_eq!(Normalisation::Identity, normalise_scores(&mut scores));
        assert_eq!([0.2, -0.2], scores);
    }

    #[test]
    fn normalise_scores_negative_sum_is_identity() {
        let mut scores = [-0.03, 0.01, -0.06];
        assert_eq!(Normalisation::Identity, normalise_scores(&mut scores));
        assert_eq!([-0.03, 0.01, -0.06], scores);
    }

    #[test]
    fn normalise_scores_empty() {
        let mut scores: [f64; 0] = [];
        assert_eq!(Normalisation::Identity, normalise_scores(&mut scores));
    }
}
