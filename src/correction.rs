//! Correction fields and the per-entrant selections made against them.
//!
//! Each [CorrectionField] admits exactly five values: `-max`, `-max/2`, `0`, `+max/2` and `+max`.
//! Selections are stored as a [Step] rather than a raw delta, so an out-of-set value cannot be
//! represented once it has been accepted.

use anyhow::bail;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Tolerance used when matching a raw delta against a field's steps.
const STEP_TOLERANCE: f64 = 1e-9;

pub const DEFAULT_MAX: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    MinusFull,
    MinusHalf,
    #[default]
    Neutral,
    PlusHalf,
    PlusFull,
}
impl Step {
    pub fn factor(&self) -> f64 {
        match self {
            Step::MinusFull => -1.0,
            Step::MinusHalf => -0.5,
            Step::Neutral => 0.0,
            Step::PlusHalf => 0.5,
            Step::PlusFull => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionField {
    pub name: String,
    pub max: f64,
}
impl CorrectionField {
    pub fn new(name: impl Into<String>, max: f64) -> Self {
        Self {
            name: name.into(),
            max,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.name.trim().is_empty() {
            bail!("correction field name cannot be blank");
        }
        if !self.max.is_finite() || self.max <= 0.0 {
            bail!(
                "maximum magnitude of correction field '{}' must be a positive number, got {}",
                self.name,
                self.max
            );
        }
        Ok(())
    }

    /// The allowed deltas, in ascending order.
    pub fn allowed(&self) -> [f64; 5] {
        let mut allowed = [0.0; 5];
        for (index, step) in Step::iter().enumerate() {
            allowed[index] = self.delta(step);
        }
        allowed
    }

    pub fn delta(&self, step: Step) -> f64 {
        self.max * step.factor()
    }

    /// Resolves a raw delta to one of this field's steps.
    pub fn step(&self, delta: f64) -> Result<Step, InvalidCorrection> {
        Step::iter()
            .find(|&step| (self.delta(step) - delta).abs() <= STEP_TOLERANCE)
            .ok_or_else(|| InvalidCorrection::Disallowed {
                field: self.name.clone(),
                delta,
                allowed: self.allowed(),
            })
    }
}

/// Distance, running-style, track and gate aptitude, each capped at [DEFAULT_MAX].
pub fn default_fields() -> Vec<CorrectionField> {
    ["distance", "running style", "track", "gate"]
        .into_iter()
        .map(|name| CorrectionField::new(name, DEFAULT_MAX))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCorrection {
    #[error("{delta} is not an allowed value for '{field}', expected one of {allowed:?}")]
    Disallowed {
        field: String,
        delta: f64,
        allowed: [f64; 5],
    },

    #[error("unknown correction field '{0}'")]
    UnknownField(String),
}

/// The step chosen for each (entrant, field). Unselected combinations are [Step::Neutral].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corrections {
    selections: FxHashMap<String, FxHashMap<String, Step>>,
}
impl Corrections {
    pub fn select(&mut self, entrant: impl Into<String>, field: impl Into<String>, step: Step) {
        self.selections
            .entry(entrant.into())
            .or_default()
            .insert(field.into(), step);
    }

    /// Selects the step matching a raw `delta`, failing if the delta is not in the field's set.
    pub fn select_delta(
        &mut self,
        entrant: impl Into<String>,
        field: &CorrectionField,
        delta: f64,
    ) -> Result<(), InvalidCorrection> {
        let step = field.step(delta)?;
        self.select(entrant, field.name.clone(), step);
        Ok(())
    }

    pub fn step(&self, entrant: &str, field: &str) -> Step {
        self.selections
            .get(entrant)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of the entrant's deltas across `fields`.
    pub fn score(&self, entrant: &str, fields: &[CorrectionField]) -> f64 {
        fields
            .iter()
            .map(|field| field.delta(self.step(entrant, &field.name)))
            .sum()
    }

    /// Entrants with at least one selection, in no particular order.
    pub fn entrants(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    /// Ensures that every selection refers to one of `fields`.
    pub fn validate(&self, fields: &[CorrectionField]) -> Result<(), InvalidCorrection> {
        for selected in self.selections.values().flat_map(|fields| fields.keys()) {
            if !fields.iter().any(|field| &field.name == selected) {
                return Err(InvalidCorrection::UnknownField(selected.clone()));
            }
        }
        Ok(())
    }
}
