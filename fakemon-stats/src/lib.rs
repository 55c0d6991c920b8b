//! Fakemon Stat Engine
//!
//! Platform-agnostic stat generation for fakemon evolution lines. Each stage
//! rolls six base stats and a Total from configured ranges; later stages never
//! regress below earlier ones, and ranges stretch when a stage outgrows them.
//! Rendering, persistence and UI wiring belong to the host.

pub mod config;
pub mod engine;
pub mod error;
pub mod profile;
pub mod ranges;
pub mod resolver;
pub mod rng;
pub mod sampler;
pub mod seed;
pub mod session;
pub mod stat;

// Re-export commonly used types
pub use config::{GeneratorConfig, MAX_STAT_INCREMENT};
pub use engine::{EditOutcome, EngineDelta, EngineState, RejectReason, StageEngine};
pub use error::{ConfigError, StatError};
pub use profile::{Climate, CreatureProfile, Diet, Habitat, Size, Type, roll_profile};
pub use ranges::{RangeChange, RangeOwner, StageRangeTable};
pub use resolver::{CEILING_MARGIN, TOTAL_STEP, resolve};
pub use rng::{CountingRng, RngBundle, aligned_sample, uniform_int};
pub use sampler::{MAX_ADJUST_ATTEMPTS, sample};
pub use seed::{decode_share_code, encode_share_code, fresh_share_code};
pub use session::Generator;
pub use stat::{MAX_STAGES, StageStatTable, Stat, StatMap, StatRange, StatRangeMap};
