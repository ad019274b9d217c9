//! Stage catalog.
//!
//! The ordered, validated set of stages a game runs through. Besides plain
//! lookups it answers "which stage owns this key", which is what lets the
//! progress and leaderboard views bucket a session's cross-stage key set.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::builtin::default_stages;
use super::model::{CharacterMood, StageDefinition, StageHints, StageSummary};
use crate::error::{EscapeError, Result};

/// Validated, read-only catalog of stages `1..=stage_count`.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
    key_owner: HashMap<String, u32>,
}

impl StageCatalog {
    /// Upper bound on the number of stages a catalog may define.
    pub const MAX_STAGES: usize = 40;

    /// Builds a catalog, validating its structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::Config` if:
    /// - the catalog is empty or has more than [`Self::MAX_STAGES`] stages
    /// - stage numbers are not exactly `1..=N` in order
    /// - a stage has no keys, or a key identifier is repeated anywhere
    /// - a stage has no `helpful` mood message
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self> {
        if stages.is_empty() {
            return Err(EscapeError::config("Stage catalog is empty"));
        }
        if stages.len() > Self::MAX_STAGES {
            return Err(EscapeError::config(format!(
                "Stage catalog has {} stages (max {})",
                stages.len(),
                Self::MAX_STAGES
            )));
        }

        let mut key_owner = HashMap::new();
        for (index, stage) in stages.iter().enumerate() {
            let expected = index as u32 + 1;
            if stage.stage != expected {
                return Err(EscapeError::config(format!(
                    "Stage numbers must be contiguous from 1: expected {}, found {}",
                    expected, stage.stage
                )));
            }
            if stage.keys.is_empty() {
                return Err(EscapeError::config(format!("Stage {} has no keys", stage.stage)));
            }
            if !stage.mood_messages.contains_key(&CharacterMood::Helpful) {
                return Err(EscapeError::config(format!(
                    "Stage {} has no 'helpful' mood message",
                    stage.stage
                )));
            }
            for key in &stage.keys {
                if let Some(owner) = key_owner.insert(key.clone(), stage.stage) {
                    return Err(EscapeError::config(format!(
                        "Key '{}' appears in stage {} and stage {}",
                        key, owner, stage.stage
                    )));
                }
            }
        }

        Ok(Self { stages, key_owner })
    }

    /// Builds the catalog shipped with the engine.
    ///
    /// # Errors
    ///
    /// Returns an error only if the builtin stages violate catalog invariants.
    pub fn builtin() -> Result<Self> {
        Self::new(default_stages())
    }

    /// Looks up a stage by number.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::NotFound` if `stage` is outside `[1, stage_count]`.
    pub fn stage_definition(&self, stage: u32) -> Result<&StageDefinition> {
        stage
            .checked_sub(1)
            .and_then(|index| self.stages.get(index as usize))
            .ok_or_else(|| EscapeError::not_found("Stage", stage.to_string()))
    }

    /// Number of stages in the catalog.
    pub fn stage_count(&self) -> u32 {
        self.stages.len() as u32
    }

    /// Whether `stage` is the last stage.
    pub fn is_final_stage(&self, stage: u32) -> bool {
        stage == self.stage_count()
    }

    /// Returns the stage that owns `key`, if the key is known.
    pub fn stage_of_key(&self, key: &str) -> Option<u32> {
        self.key_owner.get(key).copied()
    }

    /// Sum of every stage's key count.
    pub fn total_key_count(&self) -> usize {
        self.key_owner.len()
    }

    /// Iterates over the stages in order.
    pub fn stages(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter()
    }

    /// Groups `keys` by owning stage. Unknown keys are skipped.
    pub fn keys_by_stage<'a, I>(&self, keys: I) -> BTreeMap<u32, BTreeSet<String>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut grouped: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
        for key in keys {
            if let Some(stage) = self.stage_of_key(key) {
                grouped.entry(stage).or_default().insert(key.clone());
            }
        }
        grouped
    }

    /// Whether every key of `stage` is contained in `keys`.
    pub fn is_stage_cleared(&self, stage: u32, keys: &BTreeSet<String>) -> bool {
        self.stage_definition(stage)
            .map(|definition| definition.keys.iter().all(|key| keys.contains(key)))
            .unwrap_or(false)
    }

    /// Listing of every stage for the catalog query.
    pub fn stage_summaries(&self) -> Vec<StageSummary> {
        self.stages
            .iter()
            .map(|stage| StageSummary {
                stage: stage.stage,
                character: stage.character.clone(),
                difficulty: stage.difficulty,
                story: stage.story.clone(),
                total_keys: stage.key_count(),
            })
            .collect()
    }

    /// Hints for a single stage.
    ///
    /// # Errors
    ///
    /// Returns `EscapeError::NotFound` if `stage` is outside the catalog.
    pub fn stage_hints(&self, stage: u32) -> Result<StageHints> {
        let definition = self.stage_definition(stage)?;
        Ok(StageHints {
            stage: definition.stage,
            character: definition.character.clone(),
            difficulty: definition.difficulty,
            hints: definition.hints.clone(),
            instructions: definition.instructions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::model::Difficulty;

    fn stage(number: u32, keys: &[&str]) -> StageDefinition {
        StageDefinition {
            stage: number,
            character: format!("Character {}", number),
            difficulty: Difficulty::Easy,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            story: format!("Story {}", number),
            mood_messages: [(CharacterMood::Helpful, "Hello".to_string())]
                .into_iter()
                .collect(),
            instructions: "Talk".to_string(),
            hints: vec!["Be kind".to_string()],
            quick_hint: None,
        }
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = StageCatalog::builtin().unwrap();
        assert_eq!(catalog.stage_count(), 5);
        assert_eq!(catalog.stage_definition(1).unwrap().key_count(), 3);
        let summed: usize = catalog.stages().map(StageDefinition::key_count).sum();
        assert_eq!(catalog.total_key_count(), summed);
    }

    #[test]
    fn test_rejects_gaps_in_stage_numbers() {
        let err = StageCatalog::new(vec![stage(1, &["A"]), stage(3, &["B"])]).unwrap_err();
        assert!(matches!(err, EscapeError::Config(_)));
    }

    #[test]
    fn test_rejects_keys_shared_across_stages() {
        let err = StageCatalog::new(vec![stage(1, &["A", "B"]), stage(2, &["B"])]).unwrap_err();
        assert!(err.to_string().contains("'B'"));
    }

    #[test]
    fn test_rejects_empty_catalog_and_keyless_stage() {
        assert!(StageCatalog::new(Vec::new()).is_err());
        assert!(StageCatalog::new(vec![stage(1, &[])]).is_err());
    }

    #[test]
    fn test_rejects_missing_helpful_message() {
        let mut broken = stage(1, &["A"]);
        broken.mood_messages.clear();
        assert!(StageCatalog::new(vec![broken]).is_err());
    }

    #[test]
    fn test_stage_lookup_bounds() {
        let catalog = StageCatalog::new(vec![stage(1, &["A"]), stage(2, &["B"])]).unwrap();
        assert!(catalog.stage_definition(0).unwrap_err().is_not_found());
        assert!(catalog.stage_definition(3).unwrap_err().is_not_found());
        assert_eq!(catalog.stage_definition(2).unwrap().character, "Character 2");
        assert!(catalog.is_final_stage(2));
        assert!(!catalog.is_final_stage(1));
    }

    #[test]
    fn test_keys_by_stage_groups_and_skips_unknown() {
        let catalog =
            StageCatalog::new(vec![stage(1, &["A", "B"]), stage(2, &["C"])]).unwrap();
        let keys: Vec<String> = ["C", "A", "ZZZ"].iter().map(|k| k.to_string()).collect();
        let grouped = catalog.keys_by_stage(&keys);
        assert_eq!(grouped.len(), 2);
        assert!(grouped[&1].contains("A"));
        assert!(grouped[&2].contains("C"));
        assert!(catalog.is_stage_cleared(2, &grouped[&2]));
        assert!(!catalog.is_stage_cleared(1, &grouped[&1]));
    }

    #[test]
    fn test_summaries_and_hints() {
        let catalog = StageCatalog::new(vec![stage(1, &["A", "B"])]).unwrap();
        let summaries = catalog.stage_summaries();
        assert_eq!(summaries[0].total_keys, 2);
        let hints = catalog.stage_hints(1).unwrap();
        assert_eq!(hints.hints, vec!["Be kind".to_string()]);
        assert!(catalog.stage_hints(9).unwrap_err().is_not_found());
    }
}
