//! Bet types and the classes they belong to.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter, EnumString};

/// Whether a bet is settled on one entrant or on an unordered pair of entrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetClass {
    #[strum(to_string = "single")]
    Single,
    #[strum(to_string = "paired")]
    Paired,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    /// The entrant finishes first.
    #[strum(to_string = "win", serialize = "単勝")]
    Win,

    /// The entrant finishes within the paying places.
    #[strum(to_string = "place", serialize = "複勝")]
    Place,

    /// Both entrants of the pair fill the first two places, in either order.
    #[strum(to_string = "quinella", serialize = "馬連")]
    Quinella,

    /// Both entrants of the pair finish within the paying places.
    #[strum(to_string = "wide", serialize = "ワイド")]
    Wide,
}
impl BetType {
    pub fn class(&self) -> BetClass {
        match self {
            BetType::Win | BetType::Place => BetClass::Single,
            BetType::Quinella | BetType::Wide => BetClass::Paired,
        }
    }

    pub fn is_single(&self) -> bool {
        self.class() == BetClass::Single
    }

    pub fn is_paired(&self) -> bool {
        self.class() == BetClass::Paired
    }
}

/// Splits the requested bet types by class, dropping repeats but otherwise keeping their order.
pub fn partition(bet_types: &[BetType]) -> (Vec<BetType>, Vec<BetType>) {
    let mut single = vec![];
    let mut paired = vec![];
    for &bet_type in bet_types {
        let target = match bet_type.class() {
            BetClass::Single => &mut single,
            BetClass::Paired => &mut paired,
        };
        if !target.contains(&bet_type) {
            target.push(bet_type);
        }
    }
    (single, paired)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn classes() {
        assert_eq!(4, BetType::COUNT);
        let single: Vec<_> = BetType::iter().filter(BetType::is_single).collect();
        let paired: Vec<_> = BetType::iter().filter(BetType::is_paired).collect();
        assert_eq!(vec![BetType::Win, BetType::Place], single);
        assert_eq!(vec![BetType::Quinella, BetType::Wide], paired);
    }

    #[test]
    fn from_str() {
        assert_eq!(BetType::Win, BetType::from_str("win").unwrap());
        assert_eq!(BetType::Place, BetType::from_str("PLACE").unwrap());
        assert_eq!(BetType::Quinella, BetType::from_str("馬連").unwrap());
        assert_eq!(BetType::Wide, BetType::from_str("ワイド").unwrap());
        assert!(BetType::from_str("trifecta").is_err());
    }

    #[test]
    fn display() {
        assert_eq!("win", BetType::Win.to_string());
        assert_eq!("wide", BetType::Wide.to_string());
    }

    #[test]
    fn partition_dedups() {
        let (single, paired) = partition(&[
            BetType::Wide,
            BetType::Win,
            BetType::Wide,
            BetType::Place,
            BetType::Win,
        ]);
        assert_eq!(vec![BetType::Win, BetType::Place], single);
        assert_eq!(vec![BetType::Wide], paired);
    }
}
