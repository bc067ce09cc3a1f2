//! Expected-value scoring for horse races.
//!
//! Loads a race table and a place-rate table of unknown encoding and delimiter, composes a score
//! for each entrant from its market popularity, historical place-rate and discrete handicapping
//! corrections, normalises the scores into win probabilities, and values single-entrant and paired
//! bets against given odds.
//!
//! The whole pipeline is exposed as [pipeline::recompute]; every other module is a stage of it.

pub mod bet;
pub mod column;
pub mod config;
pub mod correction;
pub mod ev;
pub mod file;
pub mod pair;
pub mod pipeline;
pub mod print;
pub mod probs;
pub mod race;
pub mod score;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;
