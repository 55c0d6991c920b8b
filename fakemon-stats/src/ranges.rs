//! Configured per-stage bounds and the owner that holds them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;

use crate::error::ConfigError;
use crate::stat::{Stat, StatRange, StatRangeMap};

const DEFAULT_RANGE_DATA: &str = include_str!("../assets/default_ranges.json");

/// Configured bounds keyed by 1-based stage index; stages may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageRangeTable {
    stages: BTreeMap<u8, StatRangeMap>,
}

impl StageRangeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or any pair has `min > max`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Embedded three-stage chain used when no table is supplied.
    #[must_use]
    pub fn default_table() -> Self {
        serde_json::from_str(DEFAULT_RANGE_DATA).unwrap_or_default()
    }

    /// Reject inverted pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedRange`] for the first inverted pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (&stage, ranges) in &self.stages {
            if let Some((stat, range)) = ranges.first_inverted() {
                return Err(ConfigError::InvertedRange {
                    stage,
                    stat,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, stage: u8) -> Option<&StatRangeMap> {
        self.stages.get(&stage)
    }

    /// Entry for `stage` unless it is missing or all `[0, 0]`.
    #[must_use]
    pub fn configured(&self, stage: u8) -> Option<&StatRangeMap> {
        self.get(stage).filter(|ranges| !ranges.is_trivial())
    }

    pub fn insert(&mut self, stage: u8, ranges: StatRangeMap) {
        self.stages.insert(stage, ranges);
    }

    /// Overwrite one stat of a stage, creating the stage entry if needed.
    pub fn set_stat(&mut self, stage: u8, stat: Stat, range: StatRange) {
        self.stages.entry(stage).or_default().set(stat, range);
    }

    pub fn apply(&mut self, change: &RangeChange) {
        match *change {
            RangeChange::Stage { stage, ranges } => self.insert(stage, ranges),
            RangeChange::Stat { stage, stat, range } => self.set_stat(stage, stat, range),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &StatRangeMap)> {
        self.stages.iter().map(|(&stage, ranges)| (stage, ranges))
    }
}

impl FromIterator<(u8, StatRangeMap)> for StageRangeTable {
    fn from_iter<I: IntoIterator<Item = (u8, StatRangeMap)>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

/// Proposed update to the configured table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeChange {
    /// Replace every range of a stage.
    Stage { stage: u8, ranges: StatRangeMap },
    /// Replace a single stat's range.
    Stat {
        stage: u8,
        stat: Stat,
        range: StatRange,
    },
}

impl RangeChange {
    #[must_use]
    pub const fn stage(&self) -> u8 {
        match *self {
            Self::Stage { stage, .. } | Self::Stat { stage, .. } => stage,
        }
    }
}

/// Owner of the configured range table.
///
/// The engine only proposes changes; hosts implement this to persist them.
pub trait RangeOwner {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current configured table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read.
    fn ranges(&self) -> Result<StageRangeTable, Self::Error>;

    /// Accept a proposed change.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be stored.
    fn apply_range_change(&mut self, change: &RangeChange) -> Result<(), Self::Error>;
}

impl RangeOwner for StageRangeTable {
    type Error = Infallible;

    fn ranges(&self) -> Result<StageRangeTable, Self::Error> {
        Ok(self.clone())
    }

    fn apply_range_change(&mut self, change: &RangeChange) -> Result<(), Self::Error> {
        self.apply(change);
        Ok(())
    }
}
