//! Reconciled race data: the entrants of a single race and the externally supplied place-rates.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A runner in a race, identified by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,

    /// `None` when the source cell was blank or non-numeric.
    pub win_odds: Option<f64>,

    /// `None` when the race table has no place-odds column, or the cell could not be read.
    pub place_odds: Option<f64>,
}
impl Entrant {
    pub fn new(name: impl Into<String>, win_odds: Option<f64>) -> Self {
        Self {
            name: name.into(),
            win_odds,
            place_odds: None,
        }
    }

    pub fn with_place_odds(mut self, place_odds: Option<f64>) -> Self {
        self.place_odds = place_odds;
        self
    }
}

/// Entrants in their original (display) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceTable {
    pub entrants: Vec<Entrant>,
}
impl RaceTable {
    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entrants.iter().map(|entrant| entrant.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|other| other == name)
    }

    /// Names that appear more than once, each reported once, in order of first repetition.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = FxHashMap::default();
        let mut duplicates = vec![];
        for name in self.names() {
            let count = seen.entry(name).or_insert(0usize);
            *count += 1;
            if *count == 2 {
                duplicates.push(name);
            }
        }
        duplicates
    }
}

impl From<Vec<Entrant>> for RaceTable {
    fn from(entrants: Vec<Entrant>) -> Self {
        Self { entrants }
    }
}

/// Place-rates keyed by entrant name. Names without an entry have a place-rate of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceRates {
    rates: FxHashMap<String, f64>,
}
impl PlaceRates {
    /// Records the place-rate for `name`, replacing any earlier one.
    pub fn insert(&mut self, name: impl Into<String>, rate: f64) {
        self.rates.insert(name.into(), rate);
    }

    pub fn get(&self, name: &str) -> f64 {
        self.rates.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for PlaceRates {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut rates = PlaceRates::default();
        for (name, rate) in iter {
            rates.insert(name, rate);
        }
        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_place_rate_is_zero() {
        let rates = PlaceRates::from_iter([("A", 0.6)]);
        assert_eq!(0.6, rates.get("A"));
        assert_eq!(0.0, rates.get("Z"));
        assert!(!rates.contains("Z"));
    }

    #[test]
    fn later_place_rate_wins() {
        let rates = PlaceRates::from_iter([("A", 0.6), ("A", 0.4)]);
        assert_eq!(1, rates.len());
        assert_eq!(0.4, rates.get("A"));
    }

    #[test]
    fn duplicate_names() {
        let race = RaceTable::from(vec![
            Entrant::new("A", Some(2.0)),
            Entrant::new("B", Some(3.0)),
            Entrant::new("A", Some(4.0)),
            Entrant::new("A", Some(5.0)),
        ]);
        assert_eq!(4, race.len());
        assert!(!race.is_empty());
        assert!(RaceTable::default().is_empty());
        assert_eq!(vec!["A"], race.duplicate_names());
        assert!(race.contains("B"));
        assert!(!race.contains("C"));
    }
}
