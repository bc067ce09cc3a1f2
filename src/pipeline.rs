//! The scoring pipeline, end to end.
//!
//! [recompute] is a pure function of its inputs: it reconciles the two tables, composes and
//! normalises scores, and values every requested bet. Callers invoke it afresh whenever any input
//! changes; nothing is carried between invocations.

use std::collections::BTreeMap;
use std::io::{BufRead, Seek};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::bet::{self, BetType};
use crate::column::{self, MissingColumn};
use crate::correction::{default_fields, CorrectionField, Corrections, InvalidCorrection};
use crate::ev::{OddsOverrides, Stake, Valuation};
use crate::pair::{self, PairResult};
use crate::probs::{self, Normalisation};
use crate::race::{PlaceRates, RaceTable};
use crate::score::{self, Score};
use crate::table::{LoadError, Table};


#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    MissingColumn(#[from] MissingColumn),

    #[error("{0}")]
    InvalidCorrection(#[from] InvalidCorrection),
}

/// Everything chosen at the boundary, besides the two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub fields: Vec<CorrectionField>,
    pub corrections: Corrections,
    pub bet_types: Vec<BetType>,
    pub stake: Stake,
    pub overrides: OddsOverrides,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            corrections: Corrections::default(),
            bet_types: vec![BetType::Win],
            stake: Stake::default(),
            overrides: OddsOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrantResult {
    pub name: String,
    pub win_odds: Option<f64>,
    pub place_odds: Option<f64>,
    #[serde(flatten)]
    pub score: Score,
    pub probability: f64,
    pub valuations: BTreeMap<BetType, Valuation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub entrants: Vec<EntrantResult>,

    /// Empty unless a paired bet type was requested.
    pub pairs: Vec<PairResult>,

    pub normalisation: Normalisation,
    pub stake: Stake,
    pub single_bet_types: Vec<BetType>,
    pub paired_bet_types: Vec<BetType>,
}
impl ResultTable {
    pub fn probabilities(&self) -> Vec<f64> {
        self.entrants
            .iter()
            .map(|entrant| entrant.probability)
            .collect()
    }

    pub fn entrant(&self, name: &str) -> Option<&EntrantResult> {
        self.entrants.iter().find(|entrant| entrant.name == name)
    }

    pub fn pair(&self, a: &str, b: &str) -> Option<&PairResult> {
        self.pairs.iter().find(|pair| {
            pair.first == a && pair.second == b || pair.first == b && pair.second == a
        })
    }
}

/// Loads both tables from their streams, then [recompute]s.
pub fn recompute_streams<R: BufRead + Seek, P: BufRead + Seek>(
    race: &mut R,
    rates: &mut P,
    selections: &Selections,
) -> Result<ResultTable, PipelineError> {
    let race = Table::load(race)?;
    let rates = Table::load(rates)?;
    recompute(&race, &rates, selections)
}

/// Reconciles both tables, then [evaluate]s.
pub fn recompute(
    race: &Table,
    rates: &Table,
    selections: &Selections,
) -> Result<ResultTable, PipelineError> {
    let race = column::reconcile_race(race)?;
    let rates = column::reconcile_rates(rates)?;
    evaluate(&race, &rates, selections)
}

/// Scores, normalises and values the entrants of a reconciled race.
pub fn evaluate(
    race: &RaceTable,
    rates: &PlaceRates,
    selections: &Selections,
) -> Result<ResultTable, PipelineError> {
    selections.corrections.validate(&selections.fields)?;
    for name in selections
        .corrections
        .entrants()
        .chain(selections.overrides.entrants())
        .filter(|&name| !race.contains(name))
    {
        debug!("ignoring selections for '{name}', who is not in the race");
    }
    let unmatched = race.names().filter(|&name| !rates.contains(name)).count();
    if unmatched > 0 {
        debug!("{unmatched} entrant(s) have no place-rate and will score zero for it");
    }

    let scores = score::compose(race, rates, &selections.fields, &selections.corrections);
    let mut probabilities: Vec<_> = scores.iter().map(|score| score.composite).collect();
    let normalisation = probs::normalise_scores(&mut probabilities);
    debug!("{normalisation} normalisation, probabilities: {probabilities:?}");

    let (single_bet_types, paired_bet_types) = bet::partition(&selections.bet_types);
    let stake = selections.stake;
    let entrants = race
        .entrants
        .iter()
        .zip(scores)
        .zip(probabilities.iter().copied())
        .map(|((entrant, score), probability)| {
            let valuations = single_bet_types
                .iter()
                .map(|&bet_type| {
                    let odds = selections.overrides.resolve_single(entrant, bet_type);
                    (bet_type, Valuation::new(odds, probability, stake))
                })
                .collect();
            EntrantResult {
                name: entrant.name.clone(),
                win_odds: entrant.win_odds,
                place_odds: entrant.place_odds,
                score,
                probability,
                valuations,
            }
        })
        .collect();

    let pairs = if paired_bet_types.is_empty() {
        vec![]
    } else {
        let names: Vec<_> = race.names().collect();
        pair::synthesise_aligned(
            &names,
            &probabilities,
            &paired_bet_types,
            &selections.overrides,
            stake,
        )
    };

    Ok(ResultTable {
        entrants,
        pairs,
        normalisation,
        stake,
        single_bet_types,
        paired_bet_types,
    })
}
