//! Display-score and rank-key arithmetic.
//!
//! An abandoned run is credited a geometric share of its stored score for
//! every stage it got past:
//!
//! ```text
//! display = floor(score * sum_{i=1}^{k} 0.8^(i-1)),  k = current_stage - 1
//! ```
//!
//! The partial sum equals `(5^k - 4^k) / 5^(k-1)`, which is evaluated with
//! integers so the floor is exact for every stage count the catalog allows.

/// Weight given to stage progress in the rank key. Larger than any display score.
pub const STAGE_WEIGHT: u64 = 1 << 36;

/// Offset lifting completed runs above every non-completed rank key.
pub const COMPLETED_OFFSET: u64 = 1 << 62;

/// Display score of an abandoned run that ended in `current_stage`.
///
/// Returns 0 for a run abandoned during stage 1.
pub fn abandoned_display_score(stored_score: u32, current_stage: u32) -> u64 {
    let stages_passed = current_stage.saturating_sub(1);
    if stages_passed == 0 {
        return 0;
    }

    let numerator = 5u128.pow(stages_passed) - 4u128.pow(stages_passed);
    let denominator = 5u128.pow(stages_passed - 1);
    let display = u128::from(stored_score) * numerator / denominator;
    u64::try_from(display).unwrap_or(u64::MAX)
}

/// Rank key of a completed run.
pub fn completed_rank_key(score: u64) -> u64 {
    COMPLETED_OFFSET.saturating_add(score)
}

/// Rank key of an active or abandoned run.
pub fn in_progress_rank_key(current_stage: u32, display_score: u64) -> u64 {
    u64::from(current_stage)
        .saturating_mul(STAGE_WEIGHT)
        .saturating_add(display_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageCatalog;

    #[test]
    fn test_stage_one_abandonment_scores_zero() {
        assert_eq!(abandoned_display_score(0, 1), 0);
        assert_eq!(abandoned_display_score(99_999, 1), 0);
    }

    #[test]
    fn test_geometric_multiplier() {
        assert_eq!(abandoned_display_score(1000, 2), 1000);
        assert_eq!(abandoned_display_score(1000, 3), 1800);
        // 1 + 0.8 + 0.64 = 2.44
        assert_eq!(abandoned_display_score(1000, 4), 2440);
        // 1 + 0.8 + 0.64 + 0.512 = 2.952, floored
        assert_eq!(abandoned_display_score(333, 5), 983);
    }

    #[test]
    fn test_largest_catalog_does_not_overflow() {
        let stage = StageCatalog::MAX_STAGES as u32;
        let display = abandoned_display_score(u32::MAX, stage);
        assert!(display < 5 * u64::from(u32::MAX));
        assert!(display > 4 * u64::from(u32::MAX));
    }

    #[test]
    fn test_display_scores_stay_below_stage_weight() {
        let stage = StageCatalog::MAX_STAGES as u32;
        assert!(abandoned_display_score(u32::MAX, stage) < STAGE_WEIGHT);
    }

    #[test]
    fn test_completed_outranks_any_in_progress_run() {
        let stage = StageCatalog::MAX_STAGES as u32;
        let best_in_progress = in_progress_rank_key(stage, STAGE_WEIGHT - 1);
        assert!(completed_rank_key(1) > best_in_progress);
    }

    #[test]
    fn test_stage_dominates_score() {
        assert!(in_progress_rank_key(3, 0) > in_progress_rank_key(2, 5 * u64::from(u32::MAX)));
    }
}
