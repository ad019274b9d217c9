//! Application layer for the escape room engine.
//!
//! This crate provides use case implementations that coordinate the domain
//! model with the repositories and the challenge evaluator.

pub mod account_ledger;
pub mod game_usecase;
pub mod game_view;
pub mod leaderboard_service;
pub mod session;

pub use game_usecase::GameUseCase;
pub use game_view::GameView;
pub use leaderboard_service::LeaderboardService;
