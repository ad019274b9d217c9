use anyhow::Result;
use colored::Colorize;

use super::bootstrap::App;
use super::render;

pub fn stages(app: &App) {
    for stage in app.game.stages() {
        println!(
            "{} {} {}",
            format!("Stage {}", stage.stage).bold(),
            stage.character.bright_magenta(),
            format!("({}, {} keys)", stage.difficulty, stage.total_keys).bright_black()
        );
        println!("  {}", stage.story);
    }
}

pub fn hints(app: &App, stage: u32) -> Result<()> {
    let hints = app.game.hints(stage)?;
    println!(
        "{} {} {}",
        format!("Stage {}", hints.stage).bold(),
        hints.character.bright_magenta(),
        format!("({})", hints.difficulty).bright_black()
    );
    println!("{}", hints.instructions);
    for hint in &hints.hints {
        println!("  {} {}", "•".yellow(), hint);
    }
    Ok(())
}

pub async fn leaderboard(app: &App, limit: Option<usize>) -> Result<()> {
    let entries = app.board.leaderboard(limit).await?;
    render::leaderboard(&entries);
    Ok(())
}

pub async fn stats(app: &App) -> Result<()> {
    let stats = app.board.global_stats().await?;
    render::field("Players", stats.total_users);
    render::field("Games finished", stats.total_games);
    render::field("Games won", stats.successful_games);
    render::field("Success rate", format!("{:.2}%", stats.success_rate));
    render::field("Average score", format!("{:.2}", stats.average_score));
    render::field("Highest score", stats.highest_score);
    Ok(())
}
