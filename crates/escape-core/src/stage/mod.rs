//! Stage domain module.
//!
//! # Module Structure
//!
//! - `model`: Stage definition, character mood and difficulty types
//! - `catalog`: Validated stage catalog and key-ownership lookups
//! - `builtin`: Stages shipped with the engine

mod builtin;
mod catalog;
mod model;

// Re-export public API
pub use builtin::default_stages;
pub use catalog::StageCatalog;
pub use model::{
    CharacterMood, Difficulty, FALLBACK_QUICK_HINT, StageDefinition, StageHints, StageSummary,
};
