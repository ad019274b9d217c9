use anyhow::{Context, Result};
use clap::Args;
use escape_application::{GameUseCase, LeaderboardService};
use escape_core::stage::StageCatalog;
use escape_infrastructure::{
    ConfigService, EscapePaths, KeywordEvaluator, TomlAccountRepository,
    TomlGameResultRepository, TomlSessionRepository, TomlStageCatalogLoader,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Directory holding accounts, results and sessions
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Engine configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Stage catalog file
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Wired application services.
pub struct App {
    pub game: GameUseCase,
    pub board: LeaderboardService,
}

fn load_catalog(explicit: Option<&Path>) -> Result<StageCatalog> {
    if let Some(path) = explicit {
        return TomlStageCatalogLoader::load(path)
            .with_context(|| format!("Failed to load stage catalog {}", path.display()));
    }
    let default_path = EscapePaths::catalog_file()?;
    if default_path.exists() {
        return TomlStageCatalogLoader::load(&default_path)
            .with_context(|| format!("Failed to load stage catalog {}", default_path.display()));
    }
    Ok(StageCatalog::builtin()?)
}

/// Builds the services over the TOML stores in the data directory.
pub fn build(options: &GlobalOptions) -> Result<App> {
    let config_service = match &options.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service.get_config()?;

    let data_dir = match &options.data_dir {
        Some(dir) => dir.clone(),
        None => EscapePaths::data_dir()?,
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    tracing::debug!("[Bootstrap] Data directory: {}", data_dir.display());

    let catalog = Arc::new(load_catalog(options.catalog.as_deref())?);
    let sessions = Arc::new(TomlSessionRepository::new(&data_dir)?);
    let accounts = Arc::new(TomlAccountRepository::new(&data_dir));
    let results = Arc::new(TomlGameResultRepository::new(&data_dir));
    let evaluator = Arc::new(KeywordEvaluator::new()?);

    let game = GameUseCase::new(
        sessions.clone(),
        accounts.clone(),
        results.clone(),
        evaluator,
        catalog.clone(),
        config.clone(),
    );
    let board = LeaderboardService::new(sessions, accounts, results, catalog, config.leaderboard);

    Ok(App { game, board })
}
