//! Stage chain orchestration.
//!
//! The engine owns the generated-stat cache and a snapshot of the configured
//! table. It never writes the configured table: every operation returns the
//! range changes it proposes in an [`EngineDelta`] for the owner to apply.
use log::{debug, info};
use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{ConfigError, StatError};
use crate::ranges::{RangeChange, StageRangeTable};
use crate::resolver::resolve;
use crate::rng::{CountingRng, RngBundle};
use crate::sampler::sample;
use crate::stat::{MAX_STAGES, Stat, StageStatTable, StatMap, StatRange, StatRangeMap};

/// Mutable state threaded through every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineState {
    /// Snapshot of the externally owned configured table.
    pub configured: StageRangeTable,
    /// Generated stats, rebuilt by the engine.
    pub generated: StageStatTable,
    /// Number of stages in the chain.
    pub num_stages: u8,
}

/// Changes produced by one engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineDelta {
    /// Proposed updates for the configured table, in application order.
    pub range_changes: Vec<RangeChange>,
    /// Full generated table after the operation, when it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StageStatTable>,
}

impl EngineDelta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range_changes.is_empty() && self.stats.is_none()
    }
}

/// Why a manual range edit was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The new minimum undercuts what the previous stage already rolled.
    BelowPreviousStage { floor: u32 },
    /// The new minimum exceeds the new maximum.
    InvertedRange,
}

/// Result of [`StageEngine::edit_range`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    Accepted(EngineDelta),
    Rejected(RejectReason),
}

/// Drives generation across the stage chain.
#[derive(Debug, Clone)]
pub struct StageEngine<R = CountingRng<ChaCha20Rng>> {
    state: EngineState,
    increment: u32,
    rng: R,
}

impl StageEngine {
    /// Build an engine from validated configuration, seeding its stat stream.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: &GeneratorConfig, configured: StageRangeTable) -> Result<Self, ConfigError> {
        config.validate()?;
        let (stats, _) = RngBundle::from_user_seed(config.seed.unwrap_or_default()).into_streams();
        Ok(Self::with_rng(
            stats,
            config.num_stages,
            config.stat_increment,
            configured,
        ))
    }
}

impl<R: RngCore> StageEngine<R> {
    /// Build an engine around an arbitrary RNG without validating bounds.
    pub fn with_rng(rng: R, num_stages: u8, increment: u32, configured: StageRangeTable) -> Self {
        Self {
            state: EngineState {
                configured,
                generated: StageStatTable::new(),
                num_stages,
            },
            increment,
            rng,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &EngineState {
        &self.state
    }

    #[must_use]
    pub const fn num_stages(&self) -> u8 {
        self.state.num_stages
    }

    #[must_use]
    pub const fn increment(&self) -> u32 {
        self.increment
    }

    #[must_use]
    pub const fn configured(&self) -> &StageRangeTable {
        &self.state.configured
    }

    #[must_use]
    pub const fn generated(&self) -> &StageStatTable {
        &self.state.generated
    }

    #[must_use]
    pub fn stats(&self, stage: u8) -> Option<&StatMap> {
        self.state.generated.get(&stage)
    }

    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    /// Initial load: regenerate the whole chain from the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::ZeroIncrement`] when the increment is zero.
    pub fn load(&mut self) -> Result<EngineDelta, StatError> {
        self.regenerate_all()
    }

    /// Adopt a new configured table and regenerate everything from stage 1.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::ZeroIncrement`] when the increment is zero.
    pub fn replace_ranges(&mut self, configured: StageRangeTable) -> Result<EngineDelta, StatError> {
        self.state.configured = configured;
        self.regenerate_all()
    }

    /// Adopt the owner's current table without regenerating.
    ///
    /// Later edits and partial regenerations read from this snapshot, so hosts
    /// call this after applying proposed range changes.
    pub fn sync_ranges(&mut self, configured: StageRangeTable) {
        self.state.configured = configured;
    }

    /// Change the granularity and regenerate everything.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::ZeroIncrement`] for a zero increment; state is left untouched.
    pub fn set_increment(&mut self, increment: u32) -> Result<EngineDelta, StatError> {
        if increment == 0 {
            return Err(StatError::ZeroIncrement);
        }
        self.increment = increment;
        self.regenerate_all()
    }

    /// Grow or shrink the chain.
    ///
    /// Growth generates each new stage from its predecessor; shrinking drops the
    /// stages past the new end.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::StageOutOfRange`] when `num_stages` is outside
    /// `1..=MAX_STAGES`, or a sampling error from the new stages.
    pub fn set_num_stages(&mut self, num_stages: u8) -> Result<EngineDelta, StatError> {
        if num_stages == 0 || num_stages > MAX_STAGES {
            return Err(StatError::StageOutOfRange {
                stage: num_stages,
                num_stages: MAX_STAGES,
            });
        }
        let previous = self.state.num_stages;
        self.state.num_stages = num_stages;
        if num_stages > previous {
            debug!("growing chain from {previous} to {num_stages} stages");
            let mut delta = self.generate_from(previous + 1, false)?;
            delta.stats = Some(self.state.generated.clone());
            return Ok(delta);
        }
        if num_stages < previous {
            debug!("shrinking chain from {previous} to {num_stages} stages");
            self.state.generated.retain(|&stage, _| stage <= num_stages);
        }
        Ok(EngineDelta {
            range_changes: Vec::new(),
            stats: Some(self.state.generated.clone()),
        })
    }

    /// Re-roll `stage` and every later stage.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::StageOutOfRange`] for a stage outside the chain, or a
    /// sampling error.
    pub fn regenerate_stage(&mut self, stage: u8) -> Result<EngineDelta, StatError> {
        self.check_stage(stage)?;
        let mut delta = self.generate_from(stage, false)?;
        delta.stats = Some(self.state.generated.clone());
        Ok(delta)
    }

    /// Propose a manual edit of one stat's configured range.
    ///
    /// The edit is ignored when it would let `stage` undercut what `stage - 1`
    /// already rolled. A ceiling raised past the next stage's ceiling drags that
    /// stage's range along.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::StageOutOfRange`] for a stage outside the chain.
    pub fn edit_range(
        &mut self,
        stage: u8,
        stat: Stat,
        min: u32,
        max: u32,
    ) -> Result<EditOutcome, StatError> {
        self.check_stage(stage)?;
        if min > max {
            info!("ignoring stage {stage} {stat} edit: {min} > {max}");
            return Ok(EditOutcome::Rejected(RejectReason::InvertedRange));
        }
        if let Some(previous) = self.state.generated.get(&(stage - 1)) {
            let floor = previous.get(stat);
            if min < floor {
                info!("ignoring stage {stage} {stat} edit: {min} is below stage {} value {floor}", stage - 1);
                return Ok(EditOutcome::Rejected(RejectReason::BelowPreviousStage {
                    floor,
                }));
            }
        }

        let mut range_changes = vec![RangeChange::Stat {
            stage,
            stat,
            range: StatRange::new(min, max),
        }];
        if let Some(next) = stage.checked_add(1)
            && let Some(next_ranges) = self.state.configured.get(next)
            && max > next_ranges.get(stat).max
        {
            let floor = self
                .state
                .generated
                .get(&stage)
                .map_or(min, |stats| stats.get(stat));
            range_changes.push(RangeChange::Stat {
                stage: next,
                stat,
                range: StatRange::new(floor, max.max(floor)),
            });
        }
        Ok(EditOutcome::Accepted(EngineDelta {
            range_changes,
            stats: None,
        }))
    }

    fn check_stage(&self, stage: u8) -> Result<(), StatError> {
        if stage == 0 || stage > self.state.num_stages {
            return Err(StatError::StageOutOfRange {
                stage,
                num_stages: self.state.num_stages,
            });
        }
        Ok(())
    }

    fn regenerate_all(&mut self) -> Result<EngineDelta, StatError> {
        if self.increment == 0 {
            return Err(StatError::ZeroIncrement);
        }
        self.state.generated.clear();
        let mut delta = self.generate_from(1, true)?;
        delta.stats = Some(self.state.generated.clone());
        Ok(delta)
    }

    /// Generate `start..=num_stages`, each stage seeded by the one before it.
    fn generate_from(&mut self, start: u8, reset: bool) -> Result<EngineDelta, StatError> {
        let mut view = self.state.configured.clone();
        let mut range_changes = Vec::new();
        let mut carried: Option<StatMap> = None;
        for stage in start..=self.state.num_stages {
            let seed = match carried {
                Some(stats) => repair_seed(stats),
                None => self.seed_for(stage, reset, &view),
            };
            let ranges = resolve(stage, &seed, &view);
            let change = RangeChange::Stage { stage, ranges };
            view.apply(&change);
            range_changes.push(change);

            let stats = sample(&mut self.rng, &ranges, self.increment)?;
            debug!(
                "stage {stage}: Total {} from {} (residual {})",
                stats.get(Stat::Total),
                ranges.get(Stat::Total),
                stats.residual()
            );
            self.state.generated.insert(stage, stats);
            carried = Some(stats);
        }
        Ok(EngineDelta {
            range_changes,
            stats: None,
        })
    }

    /// Seed for the first stage of a pass.
    ///
    /// Prefers the cached predecessor, then the predecessor's configured lower
    /// bounds, then zero.
    fn seed_for(&self, stage: u8, reset: bool, view: &StageRangeTable) -> StatMap {
        let previous = stage.saturating_sub(1);
        let fallback = || {
            view.configured(previous)
                .map_or_else(StatMap::zero, StatRangeMap::lower_bounds)
        };
        if reset {
            return fallback();
        }
        match self.state.generated.get(&previous) {
            Some(cached) if cached.is_empty() => fallback(),
            Some(cached) => repair_seed(*cached),
            None => fallback(),
        }
    }
}

/// A cached spread whose base stats overshoot its declared Total reports the
/// sum as its Total, so later floors track what was really rolled.
fn repair_seed(mut seed: StatMap) -> StatMap {
    if seed.residual() < 0 {
        let sum = u32::try_from(seed.base_sum()).unwrap_or(u32::MAX);
        seed.set(Stat::Total, sum);
    }
    seed
}
