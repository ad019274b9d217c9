//! In-memory store implementations.
//!
//! Used by tests and by embedders that do not need persistence.

mod account;
mod session;

pub use account::{InMemoryAccountRepository, InMemoryGameResultRepository};
pub use session::InMemorySessionRepository;
