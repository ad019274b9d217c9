//! Game session domain model.
//!
//! A `GameSession` is one player's run through the stage catalog. It is
//! created on game start, mutated only by the turn processor (or closed by
//! an explicit end-game), and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::stage::CharacterMood;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Message typed by the player.
    Player,
    /// Response from the stage's character.
    Character,
}

/// A single entry of the append-only conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the turn
    pub role: TurnRole,
    /// Stage the turn happened in
    pub stage: u32,
    /// Message content
    pub content: String,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

/// Where a run stands, derived from `(game_over, success)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// Still accepting turns
    Active,
    /// Ended before the last stage was cleared
    Abandoned,
    /// Every stage cleared
    Completed,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CompletionStatus::Active => "active",
            CompletionStatus::Abandoned => "abandoned",
            CompletionStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// One player's progress through the stage catalog.
///
/// Invariants maintained by the turn transition:
/// - `stage` starts at 1, never decreases and never exceeds the stage count
/// - `extracted_keys` only grows
/// - `score` never decreases
/// - once `game_over` is set the session accepts no further turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Account id of the player owning this session
    pub owner_id: String,
    /// Current stage number (1-based)
    pub stage: u32,
    /// Accumulated score
    pub score: u32,
    /// Number of evaluated player turns
    pub attempts: u32,
    /// Keys collected across all stages so far
    #[serde(default)]
    pub extracted_keys: BTreeSet<String>,
    /// Append-only conversation log
    #[serde(default)]
    pub conversation_history: Vec<ConversationTurn>,
    /// Current mood of the stage's character
    #[serde(default)]
    pub character_mood: CharacterMood,
    /// How hard the character is to persuade (starts at 1)
    pub resistance_level: u32,
    /// Turns in the current stage that yielded no new key
    pub failed_attempts: u32,
    /// Terminal flag
    pub game_over: bool,
    /// Whether every stage was cleared (meaningful once `game_over`)
    pub success: bool,
    /// Set on the first turn of a freshly entered stage
    pub new_stage_start: bool,
    /// Set on exactly the response that entered a new stage
    pub stage_just_completed: bool,
    /// Optimistic concurrency counter, bumped on every persisted change
    pub version: u64,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last persisted change
    pub updated_at: DateTime<Utc>,
}

impl GameSession {
    /// Creates a fresh session at stage 1 for `owner_id`.
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            stage: 1,
            score: 0,
            attempts: 0,
            extracted_keys: BTreeSet::new(),
            conversation_history: Vec::new(),
            character_mood: CharacterMood::Helpful,
            resistance_level: 1,
            failed_attempts: 0,
            game_over: false,
            success: false,
            new_stage_start: true,
            stage_just_completed: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the session still accepts turns.
    pub fn is_open(&self) -> bool {
        !self.game_over
    }

    /// Completion status derived from the terminal flags.
    pub fn completion_status(&self) -> CompletionStatus {
        match (self.game_over, self.success) {
            (false, _) => CompletionStatus::Active,
            (true, true) => CompletionStatus::Completed,
            (true, false) => CompletionStatus::Abandoned,
        }
    }

    /// Records a persisted change: bumps the version and the update timestamp.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = at;
    }

    /// Marks the session as abandoned. Returns `false` if it was already over.
    pub fn close(&mut self, at: DateTime<Utc>) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.success = false;
        self.stage_just_completed = false;
        self.touch(at);
        true
    }

    /// Orders sessions most recently updated first, ties broken by id.
    pub fn recency_order(a: &GameSession, b: &GameSession) -> Ordering {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}
