//! Session state machine.
//!
//! A turn moves a session through two pure steps:
//!
//! 1. [`prepare_turn`] checks the session is still open and, if the current
//!    (non-final) stage was cleared by an earlier turn, enters the next stage.
//!    The evaluator judges the message against the state this returns.
//! 2. [`apply_verdict`] folds the evaluator's verdict into that state,
//!    ending the game when the final stage is cleared or the evaluator
//!    terminates it.
//!
//! Neither step touches storage, so a failed evaluation simply drops the
//! prepared state and nothing is committed.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::model::{ConversationTurn, GameSession, TurnRole};
use crate::error::{EscapeError, Result};
use crate::evaluator::EvaluatorResult;
use crate::stage::{CharacterMood, StageCatalog};

/// Opens a turn on `session`.
///
/// Clears the one-response `stage_just_completed` flag and performs a pending
/// stage transition: when every key of the current stage is held and the
/// stage is not the last, the session enters the next stage with its
/// per-stage counters reset.
///
/// # Errors
///
/// Returns `EscapeError::SessionClosed` if the session is over.
pub fn prepare_turn(session: &GameSession, catalog: &StageCatalog) -> Result<GameSession> {
    if session.game_over {
        return Err(EscapeError::session_closed(&session.id));
    }

    let mut next = session.clone();
    next.stage_just_completed = false;

    if !catalog.is_final_stage(next.stage) && catalog.is_stage_cleared(next.stage, &next.extracted_keys)
    {
        tracing::info!(
            "[Transition] Session {} cleared stage {}, entering stage {}",
            next.id,
            next.stage,
            next.stage + 1
        );
        next.stage += 1;
        next.failed_attempts = 0;
        next.new_stage_start = true;
        next.stage_just_completed = true;
        next.character_mood = CharacterMood::Helpful;
        next.resistance_level = 1;
    }

    Ok(next)
}

/// Keys of `verdict` the session may accept: those owned by the current stage.
fn accepted_keys(
    session: &GameSession,
    verdict: &EvaluatorResult,
    catalog: &StageCatalog,
) -> BTreeSet<String> {
    verdict
        .newly_extracted_keys
        .iter()
        .filter(|key| match catalog.stage_of_key(key) {
            Some(owner) if owner == session.stage => true,
            Some(owner) => {
                tracing::warn!(
                    "[Transition] Session {}: ignoring key '{}' of stage {} reported during stage {}",
                    session.id,
                    key,
                    owner,
                    session.stage
                );
                false
            }
            None => {
                tracing::warn!(
                    "[Transition] Session {}: ignoring unknown key '{}'",
                    session.id,
                    key
                );
                false
            }
        })
        .cloned()
        .collect()
}

/// Applies an evaluator verdict to a prepared session.
///
/// `prepared` must come from [`prepare_turn`]. The result is the state to
/// persist: one more attempt, the key union, non-decreasing score and
/// resistance, the two conversation entries, and the terminal flags.
pub fn apply_verdict(
    prepared: GameSession,
    message: &str,
    verdict: &EvaluatorResult,
    catalog: &StageCatalog,
    now: DateTime<Utc>,
) -> GameSession {
    let mut next = prepared;

    let accepted = accepted_keys(&next, verdict, catalog);
    let before = next.extracted_keys.len();
    next.extracted_keys.extend(accepted);
    if next.extracted_keys.len() == before {
        next.failed_attempts += 1;
    }

    next.score = next.score.saturating_add(verdict.score_delta);
    next.resistance_level = next
        .resistance_level
        .saturating_add(verdict.resistance_delta)
        .max(1);
    if let Some(mood) = verdict.mood {
        next.character_mood = mood;
    }

    next.conversation_history.push(ConversationTurn {
        role: TurnRole::Player,
        stage: next.stage,
        content: message.to_string(),
        timestamp: now,
    });
    next.conversation_history.push(ConversationTurn {
        role: TurnRole::Character,
        stage: next.stage,
        content: verdict.narrative_response.clone(),
        timestamp: now,
    });

    next.new_stage_start = false;
    next.attempts += 1;

    let all_cleared = catalog.is_final_stage(next.stage)
        && catalog.is_stage_cleared(next.stage, &next.extracted_keys);

    if all_cleared {
        tracing::info!("[Transition] Session {} cleared the final stage", next.id);
        next.game_over = true;
        next.success = true;
    } else if verdict.terminate {
        if verdict.terminate_success {
            tracing::warn!(
                "[Transition] Session {}: evaluator claimed success at stage {} without clearing every stage",
                next.id,
                next.stage
            );
        }
        tracing::info!(
            "[Transition] Session {} terminated by evaluator at stage {}",
            next.id,
            next.stage
        );
        next.game_over = true;
        next.success = false;
    }

    next.touch(now);
    next
}
