//! Infrastructure layer for the escape room engine.
//!
//! # Module Structure
//!
//! - `storage`: atomic, file-locked TOML documents
//! - `memory`: in-memory stores
//! - `toml_session_repository` / `toml_account_repository`: file-backed stores
//! - `catalog_loader`: stage catalogs from TOML
//! - `config_service` / `paths`: configuration and directory resolution
//! - `keyword_evaluator`: deterministic evaluator for terminal play

pub mod catalog_loader;
pub mod config_service;
pub mod keyword_evaluator;
pub mod memory;
pub mod paths;
pub mod storage;
pub mod toml_account_repository;
pub mod toml_session_repository;

pub use crate::catalog_loader::TomlStageCatalogLoader;
pub use crate::config_service::ConfigService;
pub use crate::keyword_evaluator::KeywordEvaluator;
pub use crate::memory::{
    InMemoryAccountRepository, InMemoryGameResultRepository, InMemorySessionRepository,
};
pub use crate::paths::EscapePaths;
pub use crate::toml_account_repository::{TomlAccountRepository, TomlGameResultRepository};
pub use crate::toml_session_repository::TomlSessionRepository;
