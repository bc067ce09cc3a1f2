//! Composition of per-entrant scores from popularity, place-rate and corrections.

use serde::{Deserialize, Serialize};

use crate::correction::{CorrectionField, Corrections};
use crate::race::{PlaceRates, RaceTable};

pub const POPULARITY_WEIGHT: f64 = 0.5;
pub const PLACE_RATE_WEIGHT: f64 = 0.3;
pub const CORRECTION_WEIGHT: f64 = 0.2;

/// The reciprocal of the win odds. Missing and non-positive odds score zero.
pub fn popularity(win_odds: Option<f64>) -> f64 {
    match win_odds {
        Some(odds) if odds > 0.0 => 1.0 / odds,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub popularity: f64,
    pub place_rate: f64,
    pub correction: f64,
    pub composite: f64,
}
impl Score {
    pub fn compose(popularity: f64, place_rate: f64, correction: f64) -> Self {
        let composite = POPULARITY_WEIGHT * popularity
            + PLACE_RATE_WEIGHT * place_rate
            + CORRECTION_WEIGHT * correction;
        Self {
            popularity,
            place_rate,
            correction,
            composite,
        }
    }
}

/// Scores every entrant of the `race`, in race order.
pub fn compose(
    race: &RaceTable,
    rates: &PlaceRates,
    fields: &[CorrectionField],
    corrections: &Corrections,
) -> Vec<Score> {
    race.entrants
        .iter()
        .map(|entrant| {
            Score::compose(
                popularity(entrant.win_odds),
                rates.get(&entrant.name),
                corrections.score(&entrant.name, fields),
            )
        })
        .collect()
}
