//! Settings that persist across runs: the correction fields on offer, the bet types to value, the
//! stake and the highlighting threshold.

use std::path::Path;

use anyhow::{bail, Context};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::bet::BetType;
use crate::correction::{default_fields, CorrectionField};
use crate::ev::Stake;
use crate::file::ReadJsonFile;

pub const DEFAULT_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub correction_fields: Vec<CorrectionField>,
    pub bet_types: Vec<BetType>,
    pub stake: u64,

    /// Expected values at or above this are highlighted. Has no bearing on the computation.
    pub threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            correction_fields: default_fields(),
            bet_types: vec![BetType::Win],
            stake: Stake::DEFAULT,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Config {
    /// Reads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let config = Self::read_json_file(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut names = FxHashSet::default();
        for field in &self.correction_fields {
            field.validate()?;
            if !names.insert(field.name.as_str()) {
                bail!("correction field '{}' is defined more than once", field.name);
            }
        }
        if self.bet_types.is_empty() {
            bail!("at least one bet type must be selected");
        }
        Stake::new(self.stake)?;
        if !self.threshold.is_finite() {
            bail!("threshold must be a finite number, got {}", self.threshold);
        }
        Ok(())
    }

    pub fn stake(&self) -> Result<Stake, anyhow::Error> {
        Ok(Stake::new(self.stake)?)
    }
}
