use anyhow::Context;
use rand_chacha::ChaCha20Rng;

use crate::config::GeneratorConfig;
use crate::engine::{EditOutcome, EngineDelta, StageEngine};
use crate::profile::{CreatureProfile, roll_profile};
use crate::ranges::{RangeChange, RangeOwner, StageRangeTable};
use crate::rng::{CountingRng, RngBundle};
use crate::stat::{Stat, StageStatTable};

/// Host session binding a stage engine to the owner of the configured table.
///
/// Range proposals from the engine are written back to the owner, and an
/// accepted edit re-reads the owner's table and regenerates the chain.
#[derive(Debug)]
pub struct Generator<O: RangeOwner> {
    owner: O,
    engine: StageEngine,
    profile_rng: CountingRng<ChaCha20Rng>,
}

impl<O: RangeOwner> Generator<O> {
    /// Create a session over `owner` using validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the owner's table
    /// cannot be read.
    pub fn new(config: &GeneratorConfig, owner: O) -> anyhow::Result<Self> {
        let ranges = owner
            .ranges()
            .map_err(anyhow::Error::new)
            .context("reading configured ranges")?;
        let engine = StageEngine::new(config, ranges)?;
        let (_, profile_rng) =
            RngBundle::from_user_seed(config.seed.unwrap_or_default()).into_streams();
        Ok(Self {
            owner,
            engine,
            profile_rng,
        })
    }

    /// Generate the whole chain from the owner's table.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling fails or a proposal cannot be stored.
    pub fn load(&mut self) -> anyhow::Result<&StageStatTable> {
        let delta = self.engine.load()?;
        self.publish(&delta)?;
        Ok(self.engine.generated())
    }

    /// Apply a manual range edit and regenerate from the updated table.
    ///
    /// # Errors
    ///
    /// Returns an error for a stage outside the chain, a sampling failure, or an
    /// owner that cannot store the change.
    pub fn edit_range(
        &mut self,
        stage: u8,
        stat: Stat,
        min: u32,
        max: u32,
    ) -> anyhow::Result<EditOutcome> {
        let outcome = self.engine.edit_range(stage, stat, min, max)?;
        if let EditOutcome::Accepted(delta) = &outcome {
            self.publish(delta)?;
            let regenerated = self.engine.load()?;
            self.publish(&regenerated)?;
        }
        Ok(outcome)
    }

    /// Re-roll `stage` and every stage after it.
    ///
    /// # Errors
    ///
    /// Returns an error for a stage outside the chain or a failed proposal.
    pub fn regenerate_stage(&mut self, stage: u8) -> anyhow::Result<&StageStatTable> {
        let delta = self.engine.regenerate_stage(stage)?;
        self.publish(&delta)?;
        Ok(self.engine.generated())
    }

    /// Resize the chain.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-bounds count or a failed proposal.
    pub fn set_num_stages(&mut self, num_stages: u8) -> anyhow::Result<&StageStatTable> {
        let delta = self.engine.set_num_stages(num_stages)?;
        self.publish(&delta)?;
        Ok(self.engine.generated())
    }

    /// Change the stat granularity and regenerate.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero increment or a failed proposal.
    pub fn set_increment(&mut self, increment: u32) -> anyhow::Result<&StageStatTable> {
        let delta = self.engine.set_increment(increment)?;
        self.publish(&delta)?;
        Ok(self.engine.generated())
    }

    pub fn roll_profile(&mut self) -> CreatureProfile {
        roll_profile(&mut self.profile_rng)
    }

    #[must_use]
    pub const fn owner(&self) -> &O {
        &self.owner
    }

    #[must_use]
    pub const fn engine(&self) -> &StageEngine {
        &self.engine
    }

    #[must_use]
    pub const fn stats(&self) -> &StageStatTable {
        self.engine.generated()
    }

    /// The owner's configured table, re-read after every published change.
    #[must_use]
    pub const fn ranges(&self) -> &StageRangeTable {
        self.engine.configured()
    }

    pub fn into_owner(self) -> O {
        self.owner
    }

    /// Store every proposal with the owner, then hand the owner's table back
    /// to the engine so later edits compare against what was stored.
    fn publish(&mut self, delta: &EngineDelta) -> anyhow::Result<()> {
        for change in &delta.range_changes {
            self.apply(change)?;
        }
        let ranges = self
            .owner
            .ranges()
            .map_err(anyhow::Error::new)
            .context("re-reading configured ranges")?;
        self.engine.sync_ranges(ranges);
        Ok(())
    }

    fn apply(&mut self, change: &RangeChange) -> anyhow::Result<()> {
        self.owner
            .apply_range_change(change)
            .map_err(anyhow::Error::new)
            .with_context(|| format!("storing stage {} ranges", change.stage()))
    }
}
