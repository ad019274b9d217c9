//! Reserved chat commands.
//!
//! A couple of words typed into the chat are handled by the engine itself
//! instead of being sent to the character. They never change the session.

use super::progress::StageProgress;

/// A chat message the engine answers without consulting the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedCommand {
    /// Show the current stage's quick hint.
    Hint,
    /// List the keys already found in the current stage.
    Keys,
}

impl ReservedCommand {
    /// Recognizes a reserved command, ignoring case and surrounding whitespace.
    pub fn parse(message: &str) -> Option<Self> {
        match message.trim().to_lowercase().as_str() {
            "hint" => Some(ReservedCommand::Hint),
            "keys" => Some(ReservedCommand::Keys),
            _ => None,
        }
    }
}

/// Formats the reply to the `keys` command.
pub fn keys_listing(progress: &StageProgress) -> String {
    if progress.current_stage_keys.is_empty() {
        return "🔑 No keys found yet. Keep trying!".to_string();
    }
    let listed = progress
        .current_stage_keys
        .iter()
        .map(|key| format!("🔑{}", key))
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "Found: {} ({}/{})",
        listed,
        progress.keys_found(),
        progress.total_keys_in_stage
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(ReservedCommand::parse("hint"), Some(ReservedCommand::Hint));
        assert_eq!(ReservedCommand::parse("  HiNt \n"), Some(ReservedCommand::Hint));
        assert_eq!(ReservedCommand::parse("\tKEYS"), Some(ReservedCommand::Keys));
        assert_eq!(ReservedCommand::parse("hint please"), None);
        assert_eq!(ReservedCommand::parse(""), None);
    }

    #[test]
    fn test_keys_listing_formats() {
        let mut progress = StageProgress {
            stage: 1,
            current_stage_keys: Vec::new(),
            total_keys_in_stage: 3,
            stage_complete: false,
        };
        assert_eq!(keys_listing(&progress), "🔑 No keys found yet. Keep trying!");

        progress.current_stage_keys = vec!["A".to_string(), "B".to_string()];
        assert_eq!(keys_listing(&progress), "Found: 🔑A | 🔑B (2/3)");
    }
}
