//! Terminal rendering of game views and reports.

use colored::Colorize;
use escape_application::GameView;
use escape_core::leaderboard::LeaderboardEntry;
use escape_core::session::CompletionStatus;

/// Prints the character's reply followed by the progress line.
pub fn game_view(view: &GameView, stage_count: u32) {
    if view.should_refresh {
        println!(
            "{}",
            format!("🚪 Stage cleared! Entering stage {}.", view.stage)
                .bright_green()
                .bold()
        );
    }

    println!("{}", format!("[{}]", view.character).bright_magenta());
    for line in view.bot_response.lines() {
        println!("{}", line.bright_blue());
    }

    println!(
        "{}",
        format!(
            "Stage {}/{} | Score {} | Keys {}/{} | Mood {} | Resistance {} | Attempts {}",
            view.stage,
            stage_count,
            view.score,
            view.keys_found_in_stage,
            view.total_keys_in_stage,
            view.character_mood,
            view.resistance_level,
            view.attempts
        )
        .bright_black()
    );

    if view.game_over {
        if view.success {
            println!("{}", "🏆 You escaped! Every stage is cleared.".bright_green().bold());
        } else {
            println!("{}", "Game over.".red().bold());
        }
    } else if view.stage_complete {
        println!(
            "{}",
            "All keys of this stage found. Your next message opens the next door.".yellow()
        );
    }
}

/// Colored completion status.
pub fn status_text(status: CompletionStatus) -> String {
    match status {
        CompletionStatus::Active => status.to_string().cyan().to_string(),
        CompletionStatus::Abandoned => status.to_string().bright_black().to_string(),
        CompletionStatus::Completed => status.to_string().green().to_string(),
    }
}

/// Prints leaderboard rows as a table.
pub fn leaderboard(entries: &[LeaderboardEntry]) {
    if entries.is_empty() {
        println!("{}", "No players yet.".bright_black());
        return;
    }
    println!(
        "{}",
        format!(
            "{:>4}  {:<20} {:>10} {:>6} {:>7} {:>6}  {}",
            "#", "Player", "Score", "Stage", "Cleared", "Keys", "Status"
        )
        .bold()
    );
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{:>4}  {:<20} {:>10} {:>6} {:>7} {:>6}  {}",
            index + 1,
            entry.username,
            entry.score,
            entry.current_stage,
            entry.stages_completed,
            format!("{}/{}", entry.keys_found, entry.total_keys_possible),
            status_text(entry.completion_status)
        );
    }
}

/// Prints a labelled value.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{} {}", format!("{:<16}", label).bright_black(), value);
}
