//! TOML stage catalog loader.
//!
//! A catalog file lists stages as an array of `[[stage]]` tables:
//!
//! ```toml
//! [[stage]]
//! stage = 1
//! character = "Pixel, the Help Desk Assistant"
//! difficulty = "easy"
//! keys = ["ACCESS-7431", "RESET-2290"]
//! story = "..."
//! instructions = "..."
//! hints = ["..."]
//! quick_hint = "..."
//!
//! [stage.moods]
//! helpful = "Hi! How can I help?"
//! suspicious = "Hmm..."
//! ```

use escape_core::error::{EscapeError, Result};
use escape_core::stage::{CharacterMood, Difficulty, StageCatalog, StageDefinition};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File-level DTO.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "stage", default)]
    stages: Vec<StageDto>,
}

/// Stage DTO. Moods and difficulty are kept as strings so that a typo is
/// reported with the stage it occurs in.
#[derive(Debug, Deserialize)]
struct StageDto {
    stage: u32,
    character: String,
    difficulty: String,
    keys: Vec<String>,
    #[serde(default)]
    story: String,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    quick_hint: Option<String>,
    #[serde(default)]
    moods: BTreeMap<String, String>,
}

impl StageDto {
    fn into_domain(self) -> Result<StageDefinition> {
        let stage = self.stage;
        let in_stage = |err: EscapeError| EscapeError::config(format!("Stage {}: {}", stage, err));

        let difficulty: Difficulty = self.difficulty.parse().map_err(in_stage)?;
        let mut mood_messages = BTreeMap::new();
        for (name, text) in self.moods {
            let mood: CharacterMood = name.parse().map_err(in_stage)?;
            mood_messages.insert(mood, text);
        }

        Ok(StageDefinition {
            stage,
            character: self.character,
            difficulty,
            keys: self.keys,
            story: self.story,
            mood_messages,
            instructions: self.instructions,
            hints: self.hints,
            quick_hint: self.quick_hint,
        })
    }
}

/// Loads stage catalogs from TOML files.
pub struct TomlStageCatalogLoader;

impl TomlStageCatalogLoader {
    /// Parses catalog TOML text.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Serialization` for malformed TOML and
    /// `EscapeError::Config` for unknown moods or difficulties and for any
    /// violated catalog invariant.
    pub fn parse(content: &str) -> Result<StageCatalog> {
        let file: CatalogFile = toml::from_str(content)?;
        let stages = file
            .stages
            .into_iter()
            .map(StageDto::into_domain)
            .collect::<Result<Vec<_>>>()?;
        StageCatalog::new(stages)
    }

    /// Reads and parses the catalog at `path`.
    pub fn load(path: &Path) -> Result<StageCatalog> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::parse(&content)?;
        tracing::info!(
            "[TomlStageCatalogLoader] Loaded {} stages from {:?}",
            catalog.stage_count(),
            path
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_STAGES: &str = r#"
[[stage]]
stage = 1
character = "Clerk"
difficulty = "easy"
keys = ["K-1", "K-2"]
story = "A dusty office."
instructions = "Get the stamps."
hints = ["Be polite."]

[stage.moods]
helpful = "Next, please."
hostile = "Out!"

[[stage]]
stage = 2
character = "Warden"
difficulty = "Legendary"
keys = ["K-3"]
quick_hint = "He likes chess."

[stage.moods]
helpful = "Speak."
"#;

    #[test]
    fn test_parses_stages() {
        let catalog = TomlStageCatalogLoader::parse(TWO_STAGES).unwrap();
        assert_eq!(catalog.stage_count(), 2);

        let first = catalog.stage_definition(1).unwrap();
        assert_eq!(first.difficulty, Difficulty::Easy);
        assert_eq!(first.mood_message(CharacterMood::Hostile), "Out!");
        assert_eq!(first.mood_message(CharacterMood::Curious), "Next, please.");

        let second = catalog.stage_definition(2).unwrap();
        assert_eq!(second.difficulty, Difficulty::Legendary);
        assert_eq!(second.quick_hint(), "He likes chess.");
        assert_eq!(catalog.stage_of_key("K-3"), Some(2));
    }

    #[test]
    fn test_unknown_mood_names_the_stage() {
        let broken = TWO_STAGES.replace("hostile =", "furious =");
        let err = TomlStageCatalogLoader::parse(&broken).unwrap_err();
        assert!(matches!(err, EscapeError::Config(ref message) if message.contains("Stage 1")));
    }

    #[test]
    fn test_catalog_invariants_are_enforced() {
        let duplicated = TWO_STAGES.replace(r#"keys = ["K-3"]"#, r#"keys = ["K-1"]"#);
        assert!(TomlStageCatalogLoader::parse(&duplicated).is_err());
        assert!(TomlStageCatalogLoader::parse("").is_err());
    }
}
