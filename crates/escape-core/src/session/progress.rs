//! Stage-scoped progress view.
//!
//! Players only ever see the keys of the stage they are in; the full
//! cross-stage key set stays internal to the session.

use serde::{Deserialize, Serialize};

use super::model::GameSession;
use crate::stage::StageCatalog;

/// What the player is shown about the current stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    /// Stage the view describes
    pub stage: u32,
    /// Extracted keys that belong to `stage`, in catalog order
    pub current_stage_keys: Vec<String>,
    /// Number of keys hidden in `stage`
    pub total_keys_in_stage: usize,
    /// Every key of `stage` found while the game is still running
    pub stage_complete: bool,
}

impl StageProgress {
    /// Number of keys found in the current stage.
    pub fn keys_found(&self) -> usize {
        self.current_stage_keys.len()
    }

    /// Derives the view for `session`'s current stage.
    ///
    /// A stage pointer outside the catalog is clamped into `[1, stage_count]`.
    pub fn summarize(session: &GameSession, catalog: &StageCatalog) -> Self {
        let stage = session.stage.clamp(1, catalog.stage_count());
        let Ok(definition) = catalog.stage_definition(stage) else {
            return Self {
                stage,
                current_stage_keys: Vec::new(),
                total_keys_in_stage: 0,
                stage_complete: false,
            };
        };

        let current_stage_keys: Vec<String> = definition
            .keys
            .iter()
            .filter(|key| session.extracted_keys.contains(*key))
            .cloned()
            .collect();
        let total_keys_in_stage = definition.key_count();
        let stage_complete = current_stage_keys.len() == total_keys_in_stage && !session.game_over;

        Self {
            stage,
            current_stage_keys,
            total_keys_in_stage,
            stage_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StageCatalog {
        StageCatalog::builtin().unwrap()
    }

    #[test]
    fn test_only_current_stage_keys_are_shown() {
        let catalog = catalog();
        let mut session = GameSession::new("p");
        session.stage = 2;
        session.extracted_keys.extend(
            ["ACCESS-7431", "RESET-2290", "ADMIN-5517", "VAULT-3075"]
                .iter()
                .map(|k| k.to_string()),
        );

        let progress = StageProgress::summarize(&session, &catalog);
        assert_eq!(progress.stage, 2);
        assert_eq!(progress.current_stage_keys, vec!["VAULT-3075".to_string()]);
        assert_eq!(progress.total_keys_in_stage, 3);
        assert!(!progress.stage_complete);
    }

    #[test]
    fn test_future_stage_keys_never_leak() {
        let catalog = catalog();
        let mut session = GameSession::new("p");
        session.extracted_keys.insert("SEAL-OMEGA".to_string());

        let progress = StageProgress::summarize(&session, &catalog);
        assert!(progress.current_stage_keys.is_empty());
    }

    #[test]
    fn test_stage_complete_requires_running_game() {
        let catalog = catalog();
        let mut session = GameSession::new("p");
        session
            .extracted_keys
            .extend(catalog.stage_definition(1).unwrap().keys.iter().cloned());

        assert!(StageProgress::summarize(&session, &catalog).stage_complete);

        session.game_over = true;
        let progress = StageProgress::summarize(&session, &catalog);
        assert!(!progress.stage_complete);
        assert_eq!(progress.keys_found(), 3);
    }

    #[test]
    fn test_out_of_range_stage_is_clamped() {
        let catalog = catalog();
        let mut session = GameSession::new("p");
        session.stage = 99;
        assert_eq!(StageProgress::summarize(&session, &catalog).stage, 5);
    }
}
