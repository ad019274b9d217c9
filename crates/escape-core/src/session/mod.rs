//! Game session domain.
//!
//! # Module Structure
//!
//! - `model`: `GameSession` and its conversation log
//! - `repository`: `SessionRepository` trait
//! - `progress`: per-stage progress summary
//! - `command`: reserved chat commands (`hint`, `keys`)
//! - `transition`: the turn state machine

mod command;
mod model;
mod progress;
mod repository;
mod transition;

pub use command::{ReservedCommand, keys_listing};
pub use model::{CompletionStatus, ConversationTurn, GameSession, TurnRole};
pub use progress::StageProgress;
pub use repository::SessionRepository;
pub use transition::{apply_verdict, prepare_turn};
