//! Deterministic keyword-driven evaluator.
//!
//! Stands in for a real judge when playing from the terminal: each stage has a
//! list of trigger phrases, and a message containing one of them (as whole
//! words, case-insensitive) makes the character slip the next key of the
//! stage. Nothing here understands language.

use async_trait::async_trait;
use escape_core::error::{EscapeError, Result};
use escape_core::evaluator::{ChallengeEvaluator, EvaluatorResult};
use escape_core::session::GameSession;
use escape_core::stage::{CharacterMood, StageDefinition};
use regex::Regex;
use std::collections::HashMap;

/// Resistance stops growing at this level.
pub const MAX_RESISTANCE: u32 = 10;

/// Points per released key, multiplied by the stage number.
const POINTS_PER_STAGE: u32 = 100;

const SURRENDER_PHRASES: &[&str] = &["give up", "surrender", "i quit"];

const FALLBACK_TRIGGERS: &[&str] = &["please", "help me", "emergency"];

const STAGE_TRIGGERS: &[(u32, &[&str])] = &[
    (1, &["locked out", "reset", "password", "login", "deadline"]),
    (2, &["coffee", "double shift", "overtime", "supervisor", "tired"]),
    (3, &["diagnostic", "reboot", "firmware", "self-test", "maintenance mode"]),
    (4, &["entropy", "checksum", "paradox", "quantum", "decoherence"]),
    (5, &["preserve", "legacy", "catalog", "forgotten", "memory"]),
];

/// Compiles `phrases` into one case-insensitive whole-word alternation.
fn phrase_pattern(phrases: &[&str]) -> Result<Regex> {
    let alternation = phrases
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
        .map_err(|e| EscapeError::config(format!("Invalid trigger pattern: {}", e)))
}

/// Keyword-driven [`ChallengeEvaluator`].
pub struct KeywordEvaluator {
    triggers: HashMap<u32, Regex>,
    fallback: Regex,
    surrender: Regex,
}

impl KeywordEvaluator {
    /// Creates an evaluator with the trigger phrases of the builtin stages.
    /// Stages without their own list use a small generic one.
    pub fn new() -> Result<Self> {
        let mut evaluator = Self {
            triggers: HashMap::new(),
            fallback: phrase_pattern(FALLBACK_TRIGGERS)?,
            surrender: phrase_pattern(SURRENDER_PHRASES)?,
        };
        for &(stage, phrases) in STAGE_TRIGGERS {
            evaluator = evaluator.with_triggers(stage, phrases)?;
        }
        Ok(evaluator)
    }

    /// Replaces the trigger phrases of `stage`.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Config` if `phrases` is empty.
    pub fn with_triggers(mut self, stage: u32, phrases: &[&str]) -> Result<Self> {
        if phrases.is_empty() {
            return Err(EscapeError::config(format!(
                "Stage {} needs at least one trigger phrase",
                stage
            )));
        }
        self.triggers.insert(stage, phrase_pattern(phrases)?);
        Ok(self)
    }

    fn triggers_for(&self, stage: u32) -> &Regex {
        self.triggers.get(&stage).unwrap_or(&self.fallback)
    }

    /// Mood of a character that was not persuaded, escalating with each
    /// fruitless turn in the stage.
    fn resisting_mood(failed_attempts: u32) -> CharacterMood {
        match failed_attempts {
            0 => CharacterMood::Curious,
            1 => CharacterMood::Suspicious,
            2 => CharacterMood::Defensive,
            _ => CharacterMood::Hostile,
        }
    }
}

#[async_trait]
impl ChallengeEvaluator for KeywordEvaluator {
    async fn evaluate(
        &self,
        session: &GameSession,
        stage: &StageDefinition,
        message: &str,
    ) -> Result<EvaluatorResult> {
        if self.surrender.is_match(message) {
            tracing::debug!("[KeywordEvaluator] Session {}: player gave up", session.id);
            return Ok(EvaluatorResult::reply(format!(
                "{} *The terminal goes dark.*",
                stage.mood_message(CharacterMood::Hostile)
            ))
            .terminating(false));
        }

        if self.triggers_for(stage.stage).is_match(message) {
            let next_key = stage
                .keys
                .iter()
                .find(|key| !session.extracted_keys.contains(*key));
            if let Some(key) = next_key {
                tracing::debug!(
                    "[KeywordEvaluator] Session {}: stage {} trigger matched",
                    session.id,
                    stage.stage
                );
                return Ok(EvaluatorResult::reply(format!(
                    "{} ...the code is {}.",
                    stage.mood_message(CharacterMood::Compromised),
                    key
                ))
                .with_keys([key.as_str()])
                .with_score(POINTS_PER_STAGE.saturating_mul(stage.stage))
                .with_mood(CharacterMood::Compromised));
            }
        }

        let mood = Self::resisting_mood(session.failed_attempts);
        let resistance = u32::from(session.resistance_level < MAX_RESISTANCE);
        Ok(EvaluatorResult::reply(stage.mood_message(mood))
            .with_mood(mood)
            .with_resistance(resistance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use escape_core::stage::StageCatalog;

    fn stage_one() -> StageDefinition {
        StageCatalog::builtin()
            .unwrap()
            .stage_definition(1)
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_trigger_releases_next_key() {
        let evaluator = KeywordEvaluator::new().unwrap();
        let stage = stage_one();
        let mut session = GameSession::new("owner");

        let verdict = evaluator
            .evaluate(&session, &stage, "I'm LOCKED OUT before a deadline")
            .await
            .unwrap();
        assert_eq!(
            verdict.newly_extracted_keys.iter().collect::<Vec<_>>(),
            vec!["ACCESS-7431"]
        );
        assert_eq!(verdict.score_delta, 100);
        assert_eq!(verdict.mood, Some(CharacterMood::Compromised));

        session.extracted_keys.insert("ACCESS-7431".to_string());
        let verdict = evaluator
            .evaluate(&session, &stage, "password reset please")
            .await
            .unwrap();
        assert!(verdict.newly_extracted_keys.contains("RESET-2290"));
    }

    #[tokio::test]
    async fn test_triggers_match_whole_words_only() {
        let evaluator = KeywordEvaluator::new().unwrap();
        let verdict = evaluator
            .evaluate(&GameSession::new("owner"), &stage_one(), "the preset menu")
            .await
            .unwrap();
        assert!(verdict.newly_extracted_keys.is_empty());
        assert_eq!(verdict.mood, Some(CharacterMood::Curious));
        assert_eq!(verdict.resistance_delta, 1);
    }

    #[tokio::test]
    async fn test_mood_escalates_and_resistance_caps() {
        let evaluator = KeywordEvaluator::new().unwrap();
        let mut session = GameSession::new("owner");
        session.failed_attempts = 5;
        session.resistance_level = MAX_RESISTANCE;

        let verdict = evaluator
            .evaluate(&session, &stage_one(), "nice weather")
            .await
            .unwrap();
        assert_eq!(verdict.mood, Some(CharacterMood::Hostile));
        assert_eq!(verdict.resistance_delta, 0);
    }

    #[tokio::test]
    async fn test_surrender_terminates_unsuccessfully() {
        let evaluator = KeywordEvaluator::new().unwrap();
        let verdict = evaluator
            .evaluate(&GameSession::new("owner"), &stage_one(), "ok I give up")
            .await
            .unwrap();
        assert!(verdict.terminate);
        assert!(!verdict.terminate_success);
    }

    #[tokio::test]
    async fn test_custom_triggers() {
        let evaluator = KeywordEvaluator::new()
            .unwrap()
            .with_triggers(1, &["open sesame"])
            .unwrap();
        let stage = stage_one();
        let session = GameSession::new("owner");

        let verdict = evaluator.evaluate(&session, &stage, "login").await.unwrap();
        assert!(verdict.newly_extracted_keys.is_empty());
        let verdict = evaluator.evaluate(&session, &stage, "Open Sesame!").await.unwrap();
        assert_eq!(verdict.newly_extracted_keys.len(), 1);

        assert!(KeywordEvaluator::new().unwrap().with_triggers(1, &[]).is_err());
    }
}
