use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::bootstrap::{self, GlobalOptions};

#[derive(Parser)]
#[command(name = "escape")]
#[command(about = "Escape room - talk your way past five guardians", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new player
    Register { username: String },
    /// Play interactively (resumes the open game unless --fresh)
    Play {
        username: String,
        /// Abandon any open game and start over
        #[arg(long)]
        fresh: bool,
    },
    /// Show the player's most recent game
    Status { username: String },
    /// End the player's open game
    End { username: String },
    /// List the stages
    Stages,
    /// Show the hints of a stage
    Hints { stage: u32 },
    /// Show the leaderboard
    Leaderboard {
        /// Number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show global statistics
    Stats,
    /// Show a player's profile
    Profile { username: String },
    /// List a player's games
    History { username: String },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    let app = bootstrap::build(&cli.options)?;

    match cli.command {
        Commands::Register { username } => commands::player::register(&app, &username).await?,
        Commands::Play { username, fresh } => commands::play::run(&app, &username, fresh).await?,
        Commands::Status { username } => commands::player::status(&app, &username).await?,
        Commands::End { username } => commands::player::end(&app, &username).await?,
        Commands::Stages => commands::info::stages(&app),
        Commands::Hints { stage } => commands::info::hints(&app, stage)?,
        Commands::Leaderboard { limit } => commands::info::leaderboard(&app, limit).await?,
        Commands::Stats => commands::info::stats(&app).await?,
        Commands::Profile { username } => commands::player::profile(&app, &username).await?,
        Commands::History { username } => commands::player::history(&app, &username).await?,
    }

    Ok(())
}
