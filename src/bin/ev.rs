use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use racing_ev::bet::BetType;
use racing_ev::config::Config;
use racing_ev::correction::Corrections;
use racing_ev::ev::{OddsOverrides, Stake};
use racing_ev::file::{write_csv, WriteJsonFile};
use racing_ev::pipeline::{self, Selections};
use racing_ev::print::{
    entrant_header, entrant_records, pair_header, pair_records, tabulate_entrants, tabulate_pairs,
};
use racing_ev::table::Table;

/// `NAME:FIELD=VALUE`, where the value is one of the field's allowed deltas.
#[derive(Debug, Clone)]
struct CorrectionArg {
    entrant: String,
    field: String,
    delta: f64,
}
impl FromStr for CorrectionArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_assignment(s)?;
        let (entrant, field) = split_target(key)?;
        Ok(Self {
            entrant: entrant.into(),
            field: field.into(),
            delta: parse_number(value)?,
        })
    }
}

/// `NAME:BET=ODDS`
#[derive(Debug, Clone)]
struct OddsArg {
    entrant: String,
    bet_type: BetType,
    odds: f64,
}
impl FromStr for OddsArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_assignment(s)?;
        let (entrant, bet_type) = split_target(key)?;
        Ok(Self {
            entrant: entrant.into(),
            bet_type: parse_bet_type(bet_type)?,
            odds: parse_number(value)?,
        })
    }
}

/// `NAME+NAME:BET=ODDS`
#[derive(Debug, Clone)]
struct PairOddsArg {
    first: String,
    second: String,
    bet_type: BetType,
    odds: f64,
}
impl FromStr for PairOddsArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = split_assignment(s)?;
        let (names, bet_type) = split_target(key)?;
        let (first, second) = names
            .split_once('+')
            .ok_or_else(|| anyhow!("expected NAME+NAME, got '{names}'"))?;
        Ok(Self {
            first: first.trim().into(),
            second: second.trim().into(),
            bet_type: parse_bet_type(bet_type)?,
            odds: parse_number(value)?,
        })
    }
}

fn split_assignment(s: &str) -> anyhow::Result<(&str, &str)> {
    s.rsplit_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{s}'"))
}

fn split_target(key: &str) -> anyhow::Result<(&str, &str)> {
    let (name, target) = key
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected NAME:TARGET, got '{key}'"))?;
    let (name, target) = (name.trim(), target.trim());
    if name.is_empty() || target.is_empty() {
        bail!("neither the name nor the target in '{key}' may be blank");
    }
    Ok((name, target))
}

fn parse_number(value: &str) -> anyhow::Result<f64> {
    value
        .trim()
        .parse()
        .with_context(|| format!("'{value}' is not a number"))
}

fn parse_bet_type(value: &str) -> anyhow::Result<BetType> {
    BetType::from_str(value).with_context(|| format!("unknown bet type '{value}'"))
}

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// race table: entrant names and win odds
    #[clap(short = 'r', long)]
    race: PathBuf,

    /// place-rate table: entrant names and historical place rates
    #[clap(short = 'p', long)]
    rates: PathBuf,

    /// JSON config file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// bet type to value (win, place, quinella or wide); may be repeated
    #[clap(short = 'b', long = "bet")]
    bets: Vec<BetType>,

    /// amount wagered on each bet
    #[clap(short = 's', long)]
    stake: Option<u64>,

    /// expected values at or above this are highlighted
    #[clap(short = 't', long)]
    threshold: Option<f64>,

    /// correction as NAME:FIELD=VALUE; may be repeated
    #[clap(long = "correction")]
    corrections: Vec<CorrectionArg>,

    /// single-entrant odds as NAME:BET=ODDS; may be repeated
    #[clap(long = "odds")]
    odds: Vec<OddsArg>,

    /// paired odds as NAME+NAME:BET=ODDS; may be repeated
    #[clap(long = "pair-odds")]
    pair_odds: Vec<PairOddsArg>,

    /// write the results as JSON to this file
    #[clap(long)]
    json: Option<PathBuf>,

    /// write the results as CSV to this file
    #[clap(long)]
    csv: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(stake) = self.stake {
            Stake::new(stake)?;
        }
        if let Some(threshold) = self.threshold {
            if !threshold.is_finite() {
                bail!("threshold must be a finite number");
            }
        }
        Ok(())
    }

    /// Folds the command line over the `config`, the former taking precedence.
    fn merge(&self, mut config: Config) -> anyhow::Result<(Config, Selections)> {
        if !self.bets.is_empty() {
            config.bet_types = self.bets.clone();
        }
        if let Some(stake) = self.stake {
            config.stake = stake;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.validate()?;

        let mut corrections = Corrections::default();
        for arg in &self.corrections {
            let field = config
                .correction_fields
                .iter()
                .find(|field| field.name == arg.field)
                .ok_or_else(|| anyhow!("unknown correction field '{}'", arg.field))?;
            corrections.select_delta(&arg.entrant, field, arg.delta)?;
        }

        let mut overrides = OddsOverrides::default();
        for arg in &self.odds {
            overrides.set_single(&arg.entrant, arg.bet_type, arg.odds)?;
        }
        for arg in &self.pair_odds {
            overrides.set_paired(&arg.first, &arg.second, arg.bet_type, arg.odds)?;
        }

        let selections = Selections {
            fields: config.correction_fields.clone(),
            corrections,
            bet_types: config.bet_types.clone(),
            stake: config.stake()?,
            overrides,
        };
        Ok((config, selections))
    }
}

fn pairs_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}-pairs.csv"))
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let (config, selections) = args.merge(config)?;
    debug!("config: {config:?}");

    let race = Table::open(&args.race)?;
    let rates = Table::open(&args.rates)?;
    info!(
        "loaded {} race row(s) ({}, {}) and {} place-rate row(s) ({}, {})",
        race.num_rows(),
        race.encoding().name(),
        race.delimiter(),
        rates.num_rows(),
        rates.encoding().name(),
        rates.delimiter()
    );

    let results = pipeline::recompute(&race, &rates, &selections)?;
    info!(
        "{} entrant(s), {} normalisation, stake {}",
        results.entrants.len(),
        results.normalisation,
        results.stake
    );
    let table = tabulate_entrants(&results, config.threshold);
    info!("\n{}", Console::default().render(&table));
    if !results.paired_bet_types.is_empty() {
        let table = tabulate_pairs(&results, config.threshold);
        info!("\n{}", Console::default().render(&table));
    }

    if let Some(path) = &args.json {
        results.write_json_file(path)?;
        info!("wrote results to {}", path.display());
    }
    if let Some(path) = &args.csv {
        write_csv(path, &entrant_header(&results), entrant_records(&results))?;
        info!("wrote entrants to {}", path.display());
        if !results.paired_bet_types.is_empty() {
            let path = pairs_path(path);
            write_csv(&path, &pair_header(&results), pair_records(&results))?;
            info!("wrote pairs to {}", path.display());
        }
    }

    Ok(())
}
