//! Player account domain module.
//!
//! # Module Structure
//!
//! - `model`: `Account` aggregate scores and `GameResult` records
//! - `repository`: `AccountRepository` and `GameResultRepository` traits

mod model;
mod repository;

pub use model::{Account, GameResult, USERNAME_MAX_LEN, USERNAME_MIN_LEN, validate_username};
pub use repository::{AccountRepository, GameResultRepository};
