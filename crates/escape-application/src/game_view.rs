//! Player-facing view of a game session.

use escape_core::session::{GameSession, StageProgress};
use escape_core::stage::{CharacterMood, StageCatalog};
use serde::{Deserialize, Serialize};

/// What the caller receives after starting, playing or inspecting a game.
///
/// Only keys of the current stage are exposed; the full cross-stage key set
/// never leaves the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub session_id: String,
    pub stage: u32,
    pub character: String,
    pub character_mood: CharacterMood,
    /// Text shown to the player for this response
    pub bot_response: String,
    /// Keys found in the current stage
    pub extracted_keys: Vec<String>,
    pub score: u32,
    pub attempts: u32,
    pub resistance_level: u32,
    pub stage_complete: bool,
    pub game_over: bool,
    pub success: bool,
    pub total_keys_in_stage: usize,
    pub keys_found_in_stage: usize,
    /// The stage changed with this response; stage metadata should be reloaded
    pub should_refresh: bool,
}

impl GameView {
    /// Builds the view of `session` carrying `bot_response`.
    pub fn new(session: &GameSession, catalog: &StageCatalog, bot_response: impl Into<String>) -> Self {
        let progress = StageProgress::summarize(session, catalog);
        let character = catalog
            .stage_definition(progress.stage)
            .map(|stage| stage.character.clone())
            .unwrap_or_default();
        let keys_found_in_stage = progress.keys_found();

        Self {
            session_id: session.id.clone(),
            stage: session.stage,
            character,
            character_mood: session.character_mood,
            bot_response: bot_response.into(),
            extracted_keys: progress.current_stage_keys,
            score: session.score,
            attempts: session.attempts,
            resistance_level: session.resistance_level,
            stage_complete: progress.stage_complete,
            game_over: session.game_over,
            success: session.success,
            total_keys_in_stage: progress.total_keys_in_stage,
            keys_found_in_stage,
            should_refresh: session.stage_just_completed,
        }
    }
}
