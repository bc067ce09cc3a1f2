//! Pair synthesis for bets settled on two entrants.
//!
//! Pairs are enumerated in natural combinatorial order over the race table: `(0, 1)`, `(0, 2)`, ...,
//! `(0, n-1)`, `(1, 2)`, and so on. Each unordered pair appears exactly once and no entrant is ever
//! paired with itself.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bet::BetType;
use crate::ev::{OddsOverrides, Stake, Valuation};

/// Applied to the product of the two win probabilities to account for either finishing order.
pub const JOINT_FACTOR: f64 = 2.0;

pub fn count_pairs(items: usize) -> usize {
    items * items.saturating_sub(1) / 2
}

/// Iterates over the index pairs of `items` elements.
#[derive(Debug, Clone)]
pub struct Pairs {
    items: usize,
    next: (usize, usize),
}
impl Pairs {
    pub fn new(items: usize) -> Self {
        Self { items, next: (0, 1) }
    }
}

impl Iterator for Pairs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (first, second) = self.next;
        if second >= self.items {
            return None;
        }
        self.next = if second + 1 < self.items {
            (first, second + 1)
        } else {
            (first + 1, first + 2)
        };
        Some((first, second))
    }
}

/// The independence approximation `p(a) × p(b) × 2`.
pub fn joint_probability(a: f64, b: f64) -> f64 {
    a * b * JOINT_FACTOR
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairResult {
    pub first: String,
    pub second: String,
    pub joint_probability: f64,
    pub valuations: BTreeMap<BetType, Valuation>,
}

/// Values every pair of `names` for each of the paired `bet_types`. Probabilities are looked up by
/// name; a name with no probability contributes zero.
pub fn synthesise(
    names: &[&str],
    probabilities: &FxHashMap<&str, f64>,
    bet_types: &[BetType],
    overrides: &OddsOverrides,
    stake: Stake,
) -> Vec<PairResult> {
    synthesise_with(
        names,
        |_, name| probabilities.get(name).copied().unwrap_or(0.0),
        bet_types,
        overrides,
        stake,
    )
}

/// As [synthesise], with `probabilities` aligned index-for-index with `names`. Entrants past the
/// end of `probabilities` contribute zero.
pub fn synthesise_aligned(
    names: &[&str],
    probabilities: &[f64],
    bet_types: &[BetType],
    overrides: &OddsOverrides,
    stake: Stake,
) -> Vec<PairResult> {
    synthesise_with(
        names,
        |index, _| probabilities.get(index).copied().unwrap_or(0.0),
        bet_types,
        overrides,
        stake,
    )
}

/// Pairs of entrants sharing a name are skipped: no override can be keyed to them.
fn synthesise_with(
    names: &[&str],
    probability: impl Fn(usize, &str) -> f64,
    bet_types: &[BetType],
    overrides: &OddsOverrides,
    stake: Stake,
) -> Vec<PairResult> {
    Pairs::new(names.len())
        .filter(|&(first, second)| {
            let same = names[first] == names[second];
            if same {
                debug!("skipping pair of two entrants named '{}'", names[first]);
            }
            !same
        })
        .map(|(first, second)| {
            let joint_probability = joint_probability(
                probability(first, names[first]),
                probability(second, names[second]),
            );
            let (first, second) = (names[first], names[second]);
            let valuations = bet_types
                .iter()
                .map(|&bet_type| {
                    let odds = overrides.paired(first, second, bet_type);
                    (bet_type, Valuation::new(odds, joint_probability, stake))
                })
                .collect();
            PairResult {
                first: first.to_string(),
                second: second.to_string(),
                joint_probability,
                valuations,
            }
        })
        .collect()
}
