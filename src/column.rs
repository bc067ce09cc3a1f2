//! Column reconciliation: locating the name, odds and place-rate columns under their accepted aliases
//! and coercing cells into numbers.

use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, warn};

use crate::race::{Entrant, PlaceRates, RaceTable};
use crate::table::Table;

pub const NAME_ALIASES: [&str; 4] = ["馬名", "name", "horse", "entrant"];

/// Win-odds aliases, tier by tier. The first tier with a matching header wins.
pub const WIN_ODDS_ALIASES: [&[&str]; 3] = [
    &["オッズ", "odds"],
    &["単勝", "win"],
    &["単勝オッズ", "win odds", "win_odds"],
];

pub const PLACE_ODDS_ALIASES: [&str; 3] = ["複勝オッズ", "place odds", "place_odds"];

pub const PLACE_RATE_ALIASES: [&str; 3] = ["複勝率", "place rate", "place_rate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Requirement {
    #[strum(to_string = "entrant name")]
    EntrantName,
    #[strum(to_string = "win odds")]
    WinOdds,
    #[strum(to_string = "place rate")]
    PlaceRate,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("missing {requirement} column, expected one of {aliases:?}")]
pub struct MissingColumn {
    pub requirement: Requirement,
    pub aliases: Vec<&'static str>,
}
impl MissingColumn {
    fn new(requirement: Requirement, aliases: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            requirement,
            aliases: aliases.into_iter().collect(),
        }
    }
}

/// Whether a header names the given alias. Matching ignores surrounding whitespace and ASCII case.
pub fn matches_alias(header: &str, alias: &str) -> bool {
    header.trim().eq_ignore_ascii_case(alias)
}

/// Index of the leftmost column whose header matches any of the `aliases`.
pub fn find_column(table: &Table, aliases: &[&str]) -> Option<usize> {
    table.headers().iter().position(|header| {
        aliases
            .iter()
            .any(|alias| matches_alias(header, alias))
    })
}

/// Locates the win-odds column, honouring the priority of alias tiers.
pub fn find_win_odds_column(table: &Table) -> Result<usize, MissingColumn> {
    WIN_ODDS_ALIASES
        .iter()
        .find_map(|tier| find_column(table, tier))
        .ok_or_else(|| {
            MissingColumn::new(
                Requirement::WinOdds,
                WIN_ODDS_ALIASES.iter().flat_map(|tier| tier.iter().copied()),
            )
        })
}

fn find_required(
    table: &Table,
    requirement: Requirement,
    aliases: &[&'static str],
) -> Result<usize, MissingColumn> {
    find_column(table, aliases).ok_or_else(|| MissingColumn::new(requirement, aliases.iter().copied()))
}

/// Parses a cell as a finite number. Blank, non-numeric and non-finite cells are missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Normalises a race table into entrants with a single canonical win-odds value each. Rows with a
/// blank name are skipped.
pub fn reconcile_race(table: &Table) -> Result<RaceTable, MissingColumn> {
    let name_col = find_required(table, Requirement::EntrantName, &NAME_ALIASES)?;
    let win_col = find_win_odds_column(table)?;
    let place_col = find_column(table, &PLACE_ODDS_ALIASES);
    debug!(
        "race columns: name '{}', win odds '{}', place odds {:?}",
        table.headers()[name_col],
        table.headers()[win_col],
        place_col.map(|col| &table.headers()[col])
    );

    let mut entrants = Vec::with_capacity(table.num_rows());
    for row in table.rows() {
        let name = row[name_col].trim();
        if name.is_empty() {
            warn!("skipping race row with a blank name: {row:?}");
            continue;
        }
        let win_odds = coerce_numeric(&row[win_col]);
        if win_odds.is_none() {
            debug!("{name}: win odds '{}' are not numeric", row[win_col]);
        }
        let place_odds = place_col.and_then(|col| coerce_numeric(&row[col]));
        entrants.push(Entrant::new(name, win_odds).with_place_odds(place_odds));
    }

    let race = RaceTable::from(entrants);
    if race.is_empty() {
        warn!("race table has no entrants");
    } else {
        debug!("reconciled {} entrant(s)", race.len());
    }
    for duplicate in race.duplicate_names() {
        warn!("entrant name '{duplicate}' appears more than once; name-keyed inputs apply to every occurrence");
    }
    Ok(race)
}

/// Normalises a place-rate table into a name-keyed mapping. Non-numeric rates read as zero; where a
/// name repeats, the last row wins.
pub fn reconcile_rates(table: &Table) -> Result<PlaceRates, MissingColumn> {
    let name_col = find_required(table, Requirement::EntrantName, &NAME_ALIASES)?;
    let rate_col = find_required(table, Requirement::PlaceRate, &PLACE_RATE_ALIASES)?;

    let rates = table
        .rows()
        .iter()
        .map(|row| (row[name_col].trim(), row[rate_col].as_str()))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, rate)| (name, coerce_numeric(rate).unwrap_or(0.0)))
        .collect::<PlaceRates>();
    debug!("read {} place-rate(s)", rates.len());
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Table {
        Table::from_bytes(text).unwrap()
    }

    #[test]
    fn generic_odds_alias_takes_priority() {
        let table = table("name,win odds,win,odds\nA,1.0,2.0,3.0\n");
        assert_eq!(3, find_win_odds_column(&table).unwrap());
        let race = reconcile_race(&table).unwrap();
        assert_eq!(Some(3.0), race.entrants[0].win_odds);
    }

    #[test]
    fn short_alias_before_qualified() {
        let table = table("name,win odds,win\nA,1.0,2.0\n");
        assert_eq!(2, find_win_odds_column(&table).unwrap());
    }

    #[test]
    fn qualified_alias() {
        let table = table("馬名,単勝オッズ\nA,5.5\n");
        let race = reconcile_race(&table).unwrap();
        assert_eq!(vec![Entrant::new("A", Some(5.5))], race.entrants);
    }

    #[test]
    fn aliases_ignore_ascii_case() {
        let table = table("Name,Win_Odds\nA,5.5\n");
        let race = reconcile_race(&table).unwrap();
        assert_eq!(Some(5.5), race.entrants[0].win_odds);
    }

    #[test]
    fn missing_odds_column() {
        let err = reconcile_race(&table("name,price\nA,5.5\n")).unwrap_err();
        assert_eq!(Requirement::WinOdds, err.requirement);
        assert_eq!(
            vec!["オッズ", "odds", "単勝", "win", "単勝オッズ", "win odds", "win_odds"],
            err.aliases
        );
        assert!(err.to_string().starts_with("missing win odds column"));
    }

    #[test]
    fn missing_name_column() {
        let err = reconcile_race(&table("runner,odds\nA,5.5\n")).unwrap_err();
        assert_eq!(Requirement::EntrantName, err.requirement);
    }

    #[test]
    fn non_numeric_odds_are_missing() {
        let race = reconcile_race(&table("name,odds\nA,scratched\nB,\nC,NaN\nD,0\n")).unwrap();
        let odds: Vec<_> = race.entrants.iter().map(|entrant| entrant.win_odds).collect();
        assert_eq!(vec![None, None, None, Some(0.0)], odds);
    }

    #[test]
    fn place_odds_are_optional() {
        let race = reconcile_race(&table("name,odds,place odds\nA,5.5,1.8\nB,3.0,-\n")).unwrap();
        assert_eq!(Some(1.8), race.entrants[0].place_odds);
        assert_eq!(None, race.entrants[1].place_odds);

        let race = reconcile_race(&table("name,odds\nA,5.5\n")).unwrap();
        assert_eq!(None, race.entrants[0].place_odds);
    }

    #[test]
    fn blank_names_are_skipped() {
        let race = reconcile_race(&table("name,odds\nA,5.5\n,3.0\n")).unwrap();
        assert_eq!(vec!["A"], race.names().collect::<Vec<_>>());
    }

    #[test]
    fn header_only_race_is_empty() {
        let race = reconcile_race(&table("name,odds\n")).unwrap();
        assert!(race.is_empty());
        assert_eq!(0, race.len());
    }

    #[test]
    fn rates_coerce_to_zero() {
        let rates = reconcile_rates(&table("馬名,複勝率\nA,0.6\nB,n/a\n")).unwrap();
        assert_eq!(0.6, rates.get("A"));
        assert_eq!(0.0, rates.get("B"));
        assert!(rates.contains("B"));
    }

    #[test]
    fn missing_rate_column() {
        let err = reconcile_rates(&table("name,odds\nA,0.6\n")).unwrap_err();
        assert_eq!(Requirement::PlaceRate, err.requirement);
        assert_eq!(vec!["複勝率", "place rate", "place_rate"], err.aliases);
    }
}
