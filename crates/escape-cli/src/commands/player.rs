use anyhow::Result;
use colored::Colorize;

use super::bootstrap::App;
use super::render;

pub async fn register(app: &App, username: &str) -> Result<()> {
    let account = app.game.register_player(username).await?;
    println!(
        "{}",
        format!("✅ Registered '{}'. Start with: escape play {}", account.username, account.username)
            .bright_green()
    );
    Ok(())
}

pub async fn status(app: &App, username: &str) -> Result<()> {
    match app.game.latest_status(username).await? {
        Some(view) => {
            render::field("Session", &view.session_id);
            render::game_view(&view, app.game.catalog().stage_count());
        }
        None => println!("{}", format!("'{}' has not played yet.", username).bright_black()),
    }
    Ok(())
}

pub async fn end(app: &App, username: &str) -> Result<()> {
    match app.game.latest_status(username).await? {
        Some(view) if !view.game_over => {
            let ended = app.game.end_game(username, &view.session_id).await?;
            println!("{}", ended.bot_response.yellow());
        }
        _ => println!("{}", format!("'{}' has no open game.", username).bright_black()),
    }
    Ok(())
}

pub async fn profile(app: &App, username: &str) -> Result<()> {
    let profile = app.game.profile(username).await?;
    println!("{}", profile.username.bright_magenta().bold());
    render::field("Score", profile.score);
    render::field("Best score", profile.best_score);
    render::field("Total score", profile.total_score);
    render::field("Games won", profile.games_played);
    render::field("In game", if profile.in_game { "yes" } else { "no" });
    render::field("Member since", profile.created_at.format("%Y-%m-%d"));
    Ok(())
}

pub async fn history(app: &App, username: &str) -> Result<()> {
    let games = app.game.history(username).await?;
    if games.is_empty() {
        println!("{}", format!("'{}' has not played yet.", username).bright_black());
        return Ok(());
    }
    for game in games {
        println!(
            "{}  stage {:>2}  score {:>6}  keys {:>3}  attempts {:>4}  {}",
            game.last_active.format("%Y-%m-%d %H:%M"),
            game.stage,
            game.score,
            game.keys_extracted,
            game.attempts,
            render::status_text(game.status)
        );
    }
    Ok(())
}
