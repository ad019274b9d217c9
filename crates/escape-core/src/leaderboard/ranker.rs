//! Leaderboard ranker.
//!
//! Reconciles completed, abandoned and active runs into one ordering. Stage
//! progress dominates for runs still (or no longer) in progress, and any
//! completed run outranks every run that is not.

use std::cmp::Ordering;

use super::integrity::audit_session;
use super::model::{LeaderboardEntry, PlayerSnapshot};
use super::scoring::{abandoned_display_score, completed_rank_key, in_progress_rank_key};
use crate::account::Account;
use crate::session::{CompletionStatus, GameSession};
use crate::stage::StageCatalog;

/// Derives the leaderboard row of one player.
pub fn derive_entry(snapshot: &PlayerSnapshot, catalog: &StageCatalog) -> LeaderboardEntry {
    match &snapshot.latest_session {
        Some(session) => entry_for_session(&snapshot.account, session, catalog),
        None => entry_without_session(&snapshot.account, catalog),
    }
}

fn entry_without_session(account: &Account, catalog: &StageCatalog) -> LeaderboardEntry {
    let total_keys_possible = catalog
        .stage_definition(1)
        .map(|stage| stage.key_count())
        .unwrap_or(0);
    LeaderboardEntry {
        username: account.username.clone(),
        score: 0,
        current_stage: 1,
        stages_completed: 0,
        keys_found: 0,
        total_keys_possible,
        completion_status: CompletionStatus::Active,
        last_active: account.created_at,
        rank_key: in_progress_rank_key(1, 0),
    }
}

fn entry_for_session(
    account: &Account,
    session: &GameSession,
    catalog: &StageCatalog,
) -> LeaderboardEntry {
    for issue in audit_session(session, catalog) {
        tracing::warn!(
            "[LeaderboardRanker] Session {} of '{}': {}",
            session.id,
            account.username,
            issue
        );
    }

    let status = session.completion_status();
    if status == CompletionStatus::Completed {
        let score = u64::from(session.score);
        return LeaderboardEntry {
            username: account.username.clone(),
            score,
            current_stage: session.stage,
            stages_completed: catalog.stage_count(),
            keys_found: session.extracted_keys.len(),
            total_keys_possible: catalog.total_key_count(),
            completion_status: status,
            last_active: session.updated_at,
            rank_key: completed_rank_key(score),
        };
    }

    let grouped = catalog.keys_by_stage(&session.extracted_keys);
    let stages_completed = grouped
        .iter()
        .filter(|(stage, keys)| catalog.is_stage_cleared(**stage, keys))
        .count() as u32;
    let keys_found = grouped
        .get(&session.stage)
        .map(|keys| keys.len())
        .unwrap_or(0);
    let total_keys_possible = catalog
        .stage_definition(session.stage)
        .map(|stage| stage.key_count())
        .unwrap_or(0);

    let score = match status {
        CompletionStatus::Abandoned => abandoned_display_score(session.score, session.stage),
        _ => u64::from(session.score),
    };

    LeaderboardEntry {
        username: account.username.clone(),
        score,
        current_stage: session.stage,
        stages_completed,
        keys_found,
        total_keys_possible,
        completion_status: status,
        last_active: session.updated_at,
        rank_key: in_progress_rank_key(session.stage, score),
    }
}

/// Deterministic leaderboard order: rank key, then most recent activity,
/// then username.
pub fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.rank_key
        .cmp(&a.rank_key)
        .then_with(|| b.last_active.cmp(&a.last_active))
        .then_with(|| a.username.cmp(&b.username))
}

/// Ranks `snapshots` and keeps the first `limit` rows.
///
/// # Arguments
///
/// * `snapshots` - One snapshot per player
/// * `catalog` - Catalog the sessions were played against
/// * `limit` - Maximum number of rows returned
pub fn rank(
    snapshots: &[PlayerSnapshot],
    catalog: &StageCatalog,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = snapshots
        .iter()
        .map(|snapshot| derive_entry(snapshot, catalog))
        .collect();
    entries.sort_by(leaderboard_order);
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn catalog() -> StageCatalog {
        StageCatalog::builtin().unwrap()
    }

    fn stage_keys(catalog: &StageCatalog, stage: u32) -> Vec<String> {
        catalog.stage_definition(stage).unwrap().keys.clone()
    }

    fn snapshot(username: &str, session: Option<GameSession>) -> PlayerSnapshot {
        PlayerSnapshot {
            account: Account::new(username).unwrap(),
            latest_session: session,
        }
    }

    fn session_at(catalog: &StageCatalog, stage: u32, score: u32) -> GameSession {
        let mut session = GameSession::new("owner");
        session.stage = stage;
        session.score = score;
        for cleared in 1..stage {
            session.extracted_keys.extend(stage_keys(catalog, cleared));
        }
        session
    }

    #[test]
    fn test_abandoned_in_stage_one_displays_zero() {
        let catalog = catalog();
        let mut session = session_at(&catalog, 1, 750);
        session.game_over = true;
        let entry = derive_entry(&snapshot("quitter", Some(session)), &catalog);
        assert_eq!(entry.completion_status, CompletionStatus::Abandoned);
        assert_eq!(entry.score, 0);
    }

    #[test]
    fn test_abandoned_at_stage_three() {
        let catalog = catalog();
        let mut session = session_at(&catalog, 3, 1000);
        session.extracted_keys.insert("SYS-4410".to_string());
        session.game_over = true;

        let entry = derive_entry(&snapshot("runner", Some(session)), &catalog);
        assert_eq!(entry.score, 1800);
        assert_eq!(entry.stages_completed, 2);
        assert_eq!(entry.keys_found, 1);
        assert_eq!(entry.total_keys_possible, 3);
        assert_eq!(entry.current_stage, 3);
    }

    #[test]
    fn test_completed_row_counts_every_key() {
        let catalog = catalog();
        let mut session = session_at(&catalog, 5, 4200);
        session.extracted_keys.extend(stage_keys(&catalog, 5));
        session.game_over = true;
        session.success = true;

        let entry = derive_entry(&snapshot("winner", Some(session)), &catalog);
        assert_eq!(entry.score, 4200);
        assert_eq!(entry.stages_completed, 5);
        assert_eq!(entry.keys_found, catalog.total_key_count());
        assert_eq!(entry.total_keys_possible, catalog.total_key_count());
    }

    #[test]
    fn test_active_row_keeps_stored_score() {
        let catalog = catalog();
        let session = session_at(&catalog, 2, 640);
        let entry = derive_entry(&snapshot("player", Some(session)), &catalog);
        assert_eq!(entry.completion_status, CompletionStatus::Active);
        assert_eq!(entry.score, 640);
        assert_eq!(entry.stages_completed, 1);
    }

    #[test]
    fn test_player_without_session() {
        let catalog = catalog();
        let snap = snapshot("newcomer", None);
        let created = snap.account.created_at;
        let entry = derive_entry(&snap, &catalog);
        assert_eq!(entry.current_stage, 1);
        assert_eq!(entry.score, 0);
        assert_eq!(entry.keys_found, 0);
        assert_eq!(entry.total_keys_possible, 3);
        assert_eq!(entry.last_active, created);
        assert_eq!(entry.completion_status, CompletionStatus::Active);
    }

    #[test]
    fn test_completed_with_score_one_beats_final_stage_active() {
        let catalog = catalog();
        let mut done = session_at(&catalog, 5, 1);
        done.extracted_keys.extend(stage_keys(&catalog, 5));
        done.game_over = true;
        done.success = true;
        let busy = session_at(&catalog, 5, u32::MAX);

        let ranked = rank(
            &[snapshot("busy", Some(busy)), snapshot("done", Some(done))],
            &catalog,
            15,
        );
        assert_eq!(ranked[0].username, "done");
        assert_eq!(ranked[1].username, "busy");
    }

    #[test]
    fn test_stage_progress_beats_raw_score() {
        let catalog = catalog();
        let ranked = rank(
            &[
                snapshot("rich", Some(session_at(&catalog, 2, 9000))),
                snapshot("deep", Some(session_at(&catalog, 3, 10))),
            ],
            &catalog,
            15,
        );
        assert_eq!(ranked[0].username, "deep");
    }

    #[test]
    fn test_ties_are_deterministic() {
        let catalog = catalog();
        let base = Utc::now();
        let mut older = session_at(&catalog, 2, 100);
        older.updated_at = base;
        let mut newer = session_at(&catalog, 2, 100);
        newer.updated_at = base + Duration::seconds(10);
        let mut same_time = session_at(&catalog, 2, 100);
        same_time.updated_at = base;

        let snapshots = vec![
            snapshot("zed", Some(older)),
            snapshot("amy", Some(same_time)),
            snapshot("bob", Some(newer)),
        ];
        let first = rank(&snapshots, &catalog, 15);
        let names: Vec<&str> = first.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "amy", "zed"]);

        let mut reversed = snapshots.clone();
        reversed.reverse();
        assert_eq!(rank(&reversed, &catalog, 15), first);
    }

    #[test]
    fn test_limit_truncates() {
        let catalog = catalog();
        let snapshots: Vec<PlayerSnapshot> = (0..5)
            .map(|i| snapshot(&format!("player{}", i), None))
            .collect();
        assert_eq!(rank(&snapshots, &catalog, 2).len(), 2);
    }
}
