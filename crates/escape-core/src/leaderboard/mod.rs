//! Leaderboard domain module.
//!
//! # Module Structure
//!
//! - `model`: `LeaderboardEntry` rows and `PlayerSnapshot` inputs
//! - `scoring`: display-score and rank-key arithmetic
//! - `integrity`: stored-session consistency audit
//! - `ranker`: per-player derivation and ordering

mod integrity;
mod model;
mod ranker;
mod scoring;

pub use integrity::{IntegrityIssue, audit_session};
pub use model::{LeaderboardEntry, PlayerSnapshot};
pub use ranker::{derive_entry, leaderboard_order, rank};
pub use scoring::{
    COMPLETED_OFFSET, STAGE_WEIGHT, abandoned_display_score, completed_rank_key,
    in_progress_rank_key,
};
