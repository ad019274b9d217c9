//! Session integrity audit.
//!
//! The state machine only accepts keys of the current stage and only advances
//! after a stage is cleared, so a stored session should never hold unknown
//! keys, keys of later stages, or an unfinished earlier stage. Sessions that
//! do were written by something else; the audit reports them and leaves the
//! data alone.

use std::fmt;

use crate::session::GameSession;
use crate::stage::StageCatalog;

/// A data inconsistency found in a stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// Key that belongs to no stage
    UnknownKey { key: String },
    /// Key of a stage the session has not reached yet
    KeyBeyondCurrentStage { key: String, key_stage: u32 },
    /// Stage below the current one whose key set is incomplete
    IncompleteEarlierStage { stage: u32 },
    /// Stage pointer outside `[1, stage_count]`
    StageOutOfRange { stage: u32 },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::UnknownKey { key } => write!(f, "unknown key '{}'", key),
            IntegrityIssue::KeyBeyondCurrentStage { key, key_stage } => {
                write!(f, "key '{}' belongs to unreached stage {}", key, key_stage)
            }
            IntegrityIssue::IncompleteEarlierStage { stage } => {
                write!(f, "stage {} was passed without all of its keys", stage)
            }
            IntegrityIssue::StageOutOfRange { stage } => {
                write!(f, "stage pointer {} is outside the catalog", stage)
            }
        }
    }
}

/// Lists every integrity issue of `session` against `catalog`.
pub fn audit_session(session: &GameSession, catalog: &StageCatalog) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if session.stage == 0 || session.stage > catalog.stage_count() {
        issues.push(IntegrityIssue::StageOutOfRange {
            stage: session.stage,
        });
    }

    for key in &session.extracted_keys {
        match catalog.stage_of_key(key) {
            None => issues.push(IntegrityIssue::UnknownKey { key: key.clone() }),
            Some(key_stage) if key_stage > session.stage => {
                issues.push(IntegrityIssue::KeyBeyondCurrentStage {
                    key: key.clone(),
                    key_stage,
                })
            }
            Some(_) => {}
        }
    }

    let last_passed = session.stage.min(catalog.stage_count() + 1);
    for stage in 1..last_passed {
        if !catalog.is_stage_cleared(stage, &session.extracted_keys) {
            issues.push(IntegrityIssue::IncompleteEarlierStage { stage });
        }
    }

    issues
}
