//! Domain layer for the escape room engine.
//!
//! Holds the stage catalog, the session state machine, the progress and
//! leaderboard derivations, and the repository / evaluator contracts that the
//! application layer wires together.

pub mod account;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod leaderboard;
pub mod session;
pub mod stage;
pub mod stats;

// Re-export common error type
pub use error::{EscapeError, Result};
