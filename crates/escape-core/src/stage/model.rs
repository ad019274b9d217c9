//! Stage domain model.
//!
//! A stage is one room of the escape challenge: a character guarding a fixed
//! set of secret keys. Stage definitions are immutable at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::EscapeError;

/// Text returned by the `hint` command when a stage defines no quick hint.
pub const FALLBACK_QUICK_HINT: &str = "💡 Try different approaches!";

/// Disposition of the character the player is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterMood {
    /// Initial mood of every character
    #[default]
    Helpful,
    Curious,
    Suspicious,
    Defensive,
    Hostile,
    /// The character's guard is down
    Compromised,
}

impl CharacterMood {
    /// All moods, in escalation order.
    pub const ALL: [CharacterMood; 6] = [
        CharacterMood::Helpful,
        CharacterMood::Curious,
        CharacterMood::Suspicious,
        CharacterMood::Defensive,
        CharacterMood::Hostile,
        CharacterMood::Compromised,
    ];

    /// Returns the lowercase name used in configuration files and views.
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterMood::Helpful => "helpful",
            CharacterMood::Curious => "curious",
            CharacterMood::Suspicious => "suspicious",
            CharacterMood::Defensive => "defensive",
            CharacterMood::Hostile => "hostile",
            CharacterMood::Compromised => "compromised",
        }
    }
}

impl fmt::Display for CharacterMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterMood {
    type Err = EscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        CharacterMood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
            .ok_or_else(|| EscapeError::invalid_input(format!("Unknown character mood '{}'", s)))
    }
}

/// Difficulty label shown next to a stage's character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Legendary,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Legendary => "Legendary",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = EscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            "legendary" => Ok(Difficulty::Legendary),
            _ => Err(EscapeError::invalid_input(format!("Unknown difficulty '{}'", s))),
        }
    }
}

/// Immutable definition of a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// 1-based stage number
    pub stage: u32,
    /// Name of the character guarding this stage
    pub character: String,
    /// Difficulty label
    pub difficulty: Difficulty,
    /// Key identifiers hidden in this stage (unique across the whole catalog)
    pub keys: Vec<String>,
    /// Scene description shown when the stage starts
    pub story: String,
    /// Character lines keyed by mood
    pub mood_messages: BTreeMap<CharacterMood, String>,
    /// Player-facing instructions
    pub instructions: String,
    /// Longer hints served by the hints-by-stage query
    #[serde(default)]
    pub hints: Vec<String>,
    /// One-line hint returned by the `hint` command
    #[serde(default)]
    pub quick_hint: Option<String>,
}

impl StageDefinition {
    /// Returns the character line for `mood`, falling back to the helpful line.
    pub fn mood_message(&self, mood: CharacterMood) -> &str {
        self.mood_messages
            .get(&mood)
            .or_else(|| self.mood_messages.get(&CharacterMood::Helpful))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Returns the text served by the `hint` command.
    pub fn quick_hint(&self) -> &str {
        self.quick_hint.as_deref().unwrap_or(FALLBACK_QUICK_HINT)
    }

    /// Whether `key` is one of this stage's keys.
    pub fn owns_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Number of keys hidden in this stage.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// Row of the stage catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: u32,
    pub character: String,
    pub difficulty: Difficulty,
    pub story: String,
    pub total_keys: usize,
}

/// Response of the hints-by-stage query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageHints {
    pub stage: u32,
    pub character: String,
    pub difficulty: Difficulty,
    pub hints: Vec<String>,
    pub instructions: String,
}
