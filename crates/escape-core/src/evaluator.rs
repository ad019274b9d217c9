//! Challenge evaluator contract.
//!
//! The evaluator is the external judge deciding whether a player's message
//! talks the character into giving something away. The engine treats it as a
//! black box: it receives the session as it stands and the message, and
//! reports a verdict the turn transition then applies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::session::GameSession;
use crate::stage::{CharacterMood, StageDefinition};

/// Verdict returned by a [`ChallengeEvaluator`] for one player message.
///
/// Numeric fields are contributions; the engine never lowers score or
/// resistance because of a verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorResult {
    /// Keys the character gave away in this turn
    #[serde(default)]
    pub newly_extracted_keys: BTreeSet<String>,
    /// New mood of the character, `None` keeps the current one
    #[serde(default)]
    pub mood: Option<CharacterMood>,
    /// Increase of the character's resistance
    #[serde(default)]
    pub resistance_delta: u32,
    /// The character's reply shown to the player
    pub narrative_response: String,
    /// Points earned in this turn
    #[serde(default)]
    pub score_delta: u32,
    /// The evaluator ends the game
    #[serde(default)]
    pub terminate: bool,
    /// Whether the evaluator considers a terminated game won
    #[serde(default)]
    pub terminate_success: bool,
}

impl EvaluatorResult {
    /// A verdict carrying only a reply.
    pub fn reply(narrative_response: impl Into<String>) -> Self {
        Self {
            narrative_response: narrative_response.into(),
            ..Self::default()
        }
    }

    /// Adds extracted keys to the verdict.
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.newly_extracted_keys
            .extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the score earned in this turn.
    pub fn with_score(mut self, score_delta: u32) -> Self {
        self.score_delta = score_delta;
        self
    }

    /// Sets the character's new mood.
    pub fn with_mood(mut self, mood: CharacterMood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Sets the resistance increase.
    pub fn with_resistance(mut self, resistance_delta: u32) -> Self {
        self.resistance_delta = resistance_delta;
        self
    }

    /// Marks the verdict as ending the game.
    pub fn terminating(mut self, success: bool) -> Self {
        self.terminate = true;
        self.terminate_success = success;
        self
    }
}

/// External judge of player messages.
///
/// Implementations may take arbitrarily long; the application layer bounds
/// each call with a timeout and treats any error as a failed turn.
#[async_trait]
pub trait ChallengeEvaluator: Send + Sync {
    /// Judges `message` against the character of `stage`.
    ///
    /// # Arguments
    ///
    /// * `session` - The session as the turn sees it (stage transition already applied)
    /// * `stage` - Definition of the session's current stage
    /// * `message` - The player's message
    ///
    /// # Errors
    ///
    /// Any error fails the whole turn without mutating the session.
    async fn evaluate(
        &self,
        session: &GameSession,
        stage: &StageDefinition,
        message: &str,
    ) -> Result<EvaluatorResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_composes_fields() {
        let verdict = EvaluatorResult::reply("fine, take it")
            .with_keys(["A", "B"])
            .with_score(150)
            .with_mood(CharacterMood::Compromised)
            .with_resistance(2);
        assert_eq!(verdict.newly_extracted_keys.len(), 2);
        assert_eq!(verdict.score_delta, 150);
        assert_eq!(verdict.mood, Some(CharacterMood::Compromised));
        assert_eq!(verdict.resistance_delta, 2);
        assert!(!verdict.terminate);
    }

    #[test]
    fn test_deserializes_with_missing_optional_fields() {
        let verdict: EvaluatorResult =
            serde_json::from_str(r#"{"narrative_response": "no"}"#).unwrap();
        assert_eq!(verdict, EvaluatorResult::reply("no"));
    }
}
