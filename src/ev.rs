//! Expected value and expected payout, and the manually entered odds that feed them.

use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bet::{BetClass, BetType};
use crate::race::Entrant;

/// Odds multiplied by probability. Missing and non-positive odds are worth nothing.
pub fn expected_value(odds: Option<f64>, probability: f64) -> f64 {
    match odds {
        Some(odds) if odds > 0.0 => odds * probability,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stake must be at least {} unit(s), got {0}", Stake::MIN)]
pub struct InvalidStake(pub u64);

/// The amount wagered on each bet, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Stake(u64);
impl Stake {
    pub const MIN: u64 = 1;
    pub const DEFAULT: u64 = 100;

    pub fn new(units: u64) -> Result<Self, InvalidStake> {
        if units < Self::MIN {
            return Err(InvalidStake(units));
        }
        Ok(Self(units))
    }

    pub fn units(&self) -> u64 {
        self.0
    }
}

impl Default for Stake {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u64> for Stake {
    type Error = InvalidStake;

    fn try_from(units: u64) -> Result<Self, Self::Error> {
        Self::new(units)
    }
}

impl From<Stake> for u64 {
    fn from(stake: Stake) -> Self {
        stake.0
    }
}

impl Display for Stake {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The odds used for one bet, and what they are expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub odds: Option<f64>,
    pub expected_value: f64,
    pub payout: f64,
}
impl Valuation {
    pub fn new(odds: Option<f64>, probability: f64, stake: Stake) -> Self {
        let expected_value = expected_value(odds, probability);
        Self {
            odds,
            expected_value,
            payout: expected_value * stake.units() as f64,
        }
    }

    /// Whether the expected value reaches the given highlighting `threshold`.
    pub fn meets(&self, threshold: f64) -> bool {
        self.expected_value >= threshold
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidOverride {
    #[error("{bet_type} is a {} bet, expected a {expected} bet", .bet_type.class())]
    WrongClass {
        bet_type: BetType,
        expected: BetClass,
    },

    #[error("'{0}' cannot be paired with itself")]
    SelfPair(String),

    #[error("odds must be a finite number, got {0}")]
    NonFinite(f64),
}

/// An unordered pair of entrant names. The names are stored in lexical order so that either
/// ordering of the same two entrants yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);
impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Odds entered by hand. Single-entrant overrides take precedence over the odds read from the race
/// table; paired odds have no table counterpart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OddsOverrides {
    single: FxHashMap<String, FxHashMap<BetType, f64>>,
    paired: FxHashMap<PairKey, FxHashMap<BetType, f64>>,
}
impl OddsOverrides {
    pub fn set_single(
        &mut self,
        entrant: impl Into<String>,
        bet_type: BetType,
        odds: f64,
    ) -> Result<(), InvalidOverride> {
        check_class(bet_type, BetClass::Single)?;
        check_finite(odds)?;
        self.single
            .entry(entrant.into())
            .or_default()
            .insert(bet_type, odds);
        Ok(())
    }

    pub fn set_paired(
        &mut self,
        a: impl Into<String>,
        b: impl Into<String>,
        bet_type: BetType,
        odds: f64,
    ) -> Result<(), InvalidOverride> {
        check_class(bet_type, BetClass::Paired)?;
        check_finite(odds)?;
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(InvalidOverride::SelfPair(a));
        }
        self.paired
            .entry(PairKey::new(a, b))
            .or_default()
            .insert(bet_type, odds);
        Ok(())
    }

    pub fn single(&self, entrant: &str, bet_type: BetType) -> Option<f64> {
        self.single
            .get(entrant)
            .and_then(|odds| odds.get(&bet_type))
            .copied()
    }

    pub fn paired(&self, a: &str, b: &str, bet_type: BetType) -> Option<f64> {
        self.paired
            .get(&PairKey::new(a, b))
            .and_then(|odds| odds.get(&bet_type))
            .copied()
    }

    /// The odds for a single-entrant bet: the manual override if there is one, otherwise the
    /// corresponding column of the race table.
    pub fn resolve_single(&self, entrant: &Entrant, bet_type: BetType) -> Option<f64> {
        self.single(&entrant.name, bet_type).or(match bet_type {
            BetType::Win => entrant.win_odds,
            BetType::Place => entrant.place_odds,
            BetType::Quinella | BetType::Wide => None,
        })
    }

    /// Entrant names referred to by any override, in no particular order. Names may repeat.
    pub fn entrants(&self) -> impl Iterator<Item = &str> {
        self.single.keys().map(String::as_str).chain(
            self.paired
                .keys()
                .flat_map(|PairKey(a, b)| [a.as_str(), b.as_str()]),
        )
    }
}

fn check_class(bet_type: BetType, expected: BetClass) -> Result<(), InvalidOverride> {
    if bet_type.class() != expected {
        return Err(InvalidOverride::WrongClass { bet_type, expected });
    }
    Ok(())
}

fn check_finite(odds: f64) -> Result<(), InvalidOverride> {
    if !odds.is_finite() {
        return Err(InvalidOverride::NonFinite(odds));
    }
    Ok(())
}
