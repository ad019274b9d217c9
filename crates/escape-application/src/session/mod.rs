//! Session application services.
//!
//! This module contains the application-layer machinery around game
//! sessions: the per-session lock registry, the turn processor and the
//! find → mutate → compare-and-update helper.

mod locks;
mod turn;
mod updater;

pub use locks::SessionLocks;
pub use turn::{TurnOutcome, TurnProcessor};
pub use updater::SessionUpdater;
