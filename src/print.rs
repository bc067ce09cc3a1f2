//! Presentation of a [ResultTable], either as console tables or as flat records for export.

use std::collections::BTreeMap;

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::bet::BetType;
use crate::ev::Valuation;
use crate::pipeline::ResultTable;

/// Marks a row in which at least one expected value meets the threshold.
pub const HIGHLIGHT: &str = "*";

fn format_odds(odds: Option<f64>) -> String {
    match odds {
        Some(odds) => format!("{odds:.1}"),
        None => "-".into(),
    }
}

fn valuation_header(bet_types: &[BetType]) -> impl Iterator<Item = String> + '_ {
    bet_types.iter().flat_map(|bet_type| {
        [
            format!("{bet_type} odds"),
            format!("{bet_type} EV"),
            format!("{bet_type} payout"),
        ]
    })
}

fn valuation_cells<'a>(
    bet_types: &'a [BetType],
    valuations: &'a BTreeMap<BetType, Valuation>,
) -> impl Iterator<Item = String> + 'a {
    bet_types.iter().flat_map(|bet_type| match valuations.get(bet_type) {
        Some(valuation) => [
            format_odds(valuation.odds),
            format!("{:.3}", valuation.expected_value),
            format!("{:.1}", valuation.payout),
        ],
        None => ["-".into(), "-".into(), "-".into()],
    })
}

fn meets_any<'a>(mut valuations: impl Iterator<Item = &'a Valuation>, threshold: f64) -> bool {
    valuations.any(|valuation| valuation.meets(threshold))
}

pub fn entrant_header(results: &ResultTable) -> Vec<String> {
    [
        "Name",
        "Odds",
        "Place rate",
        "Correction",
        "Score",
        "Probability",
    ]
    .into_iter()
    .map(String::from)
    .chain(valuation_header(&results.single_bet_types))
    .collect()
}

/// One record per entrant, in race-table order, aligned with [entrant_header].
pub fn entrant_records(results: &ResultTable) -> Vec<Vec<String>> {
    results
        .entrants
        .iter()
        .map(|entrant| {
            [
                entrant.name.clone(),
                format_odds(entrant.win_odds),
                format!("{:.3}", entrant.score.place_rate),
                format!("{:+.3}", entrant.score.correction),
                format!("{:.4}", entrant.score.composite),
                format!("{:.6}", entrant.probability),
            ]
            .into_iter()
            .chain(valuation_cells(&results.single_bet_types, &entrant.valuations))
            .collect()
        })
        .collect()
}

pub fn pair_header(results: &ResultTable) -> Vec<String> {
    ["First", "Second", "Joint probability"]
        .into_iter()
        .map(String::from)
        .chain(valuation_header(&results.paired_bet_types))
        .collect()
}

/// One record per pair, in enumeration order, aligned with [pair_header].
pub fn pair_records(results: &ResultTable) -> Vec<Vec<String>> {
    results
        .pairs
        .iter()
        .map(|pair| {
            [
                pair.first.clone(),
                pair.second.clone(),
                format!("{:.6}", pair.joint_probability),
            ]
            .into_iter()
            .chain(valuation_cells(&results.paired_bet_types, &pair.valuations))
            .collect()
        })
        .collect()
}

fn tabulate(header: Vec<String>, records: Vec<Vec<String>>, highlights: Vec<bool>) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default().with(MinWidth(10)).with(HAlign::Left),
            )];
            for _ in 1..header.len() {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(8)).with(HAlign::Right),
                ));
            }
            cols.push(Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(3))
                    .with(HAlign::Centred),
            ));
            cols
        })
        .with_row({
            let mut header_cells: Vec<Cell> = header.into_iter().map(Into::into).collect();
            header_cells.push("".into());
            Row::new(Styles::default().with(Header(true)), header_cells)
        });

    for (record, highlight) in records.into_iter().zip(highlights) {
        let mut row_cells: Vec<Cell> = record.into_iter().map(Into::into).collect();
        row_cells.push(if highlight { HIGHLIGHT } else { "" }.into());
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

/// Single-entrant results, marking each row with an expected value of at least `threshold`.
pub fn tabulate_entrants(results: &ResultTable, threshold: f64) -> Table {
    let highlights = results
        .entrants
        .iter()
        .map(|entrant| meets_any(entrant.valuations.values(), threshold))
        .collect();
    tabulate(entrant_header(results), entrant_records(results), highlights)
}

/// Paired results, marking each row with an expected value of at least `threshold`.
pub fn tabulate_pairs(results: &ResultTable, threshold: f64) -> Table {
    let highlights = results
        .pairs
        .iter()
        .map(|pair| meets_any(pair.valuations.values(), threshold))
        .collect();
    tabulate(pair_header(results), pair_records(results), highlights)
}
