//! Interactive game loop.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::bootstrap::App;
use super::render;

/// Local commands handled by the REPL itself.
const LOCAL_COMMANDS: [&str; 3] = ["/quit", "/status", "/end"];

/// Completion and highlighting of the local commands.
struct PlayHelper;

impl Helper for PlayHelper {}

impl Completer for PlayHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = LOCAL_COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for PlayHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for PlayHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        LOCAL_COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for PlayHelper {}

/// Runs a game of `username` in the terminal until it ends or the player
/// quits. Quitting keeps the game open for later.
pub async fn run(app: &App, username: &str, fresh: bool) -> Result<()> {
    let stage_count = app.game.catalog().stage_count();
    let start = if fresh {
        app.game.start_fresh(username).await?
    } else {
        app.game.start_game(username).await?
    };
    let session_id = start.session_id.clone();
    render::game_view(&start, stage_count);
    if start.game_over {
        return Ok(());
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(PlayHelper));

    println!();
    println!(
        "{}",
        "Talk to the character. 'hint' and 'keys' ask the game, '/status', '/end' and '/quit' control the session."
            .bright_black()
    );

    loop {
        let line = match rl.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to leave.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        match trimmed {
            "/quit" => {
                println!("{}", "Your game is saved. See you soon!".bright_green());
                break;
            }
            "/status" => {
                let view = app.game.get_status(username, &session_id).await?;
                render::game_view(&view, stage_count);
                continue;
            }
            "/end" => {
                let view = app.game.end_game(username, &session_id).await?;
                render::game_view(&view, stage_count);
                break;
            }
            _ => {}
        }

        match app.game.send_message(username, &session_id, trimmed).await {
            Ok(view) => {
                render::game_view(&view, stage_count);
                if view.game_over {
                    break;
                }
            }
            Err(err) if err.is_session_closed() => {
                println!("{}", "This game is over.".red());
                break;
            }
            Err(err) if err.is_evaluation_failed() || err.is_invalid_input() => {
                println!("{}", format!("⚠️  {}", err).yellow());
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
