//! Save/load contract for the arena
//!
//! Only source data is stored. Tiers, the leaderboard and expiry tasks are
//! rebuilt on load so a changed tier table or format list cannot leave stale
//! derived state behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::arena::Arena;
use crate::error::PersistError;
use crate::events::ArenaEvent;
use crate::history::{MatchHistory, MatchRecord, TournamentSummary};
use crate::leaderboard::Leaderboard;
use crate::orchestrator::summarize;
use crate::profile::ArenaProfile;
use crate::registry::PlayerRegistry;
use crate::schedule::ExpiryScheduler;
use crate::tournament::Tournament;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub players: Vec<ArenaProfile>,
    #[serde(default)]
    pub tournaments: Vec<Tournament>,
    /// Most recent match records, oldest first
    #[serde(default)]
    pub history: Vec<MatchRecord>,
    #[serde(default)]
    pub results: Vec<TournamentSummary>,
}

impl ArenaSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, PersistError> {
        let snapshot: ArenaSnapshot = serde_json::from_str(contents)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Save the snapshot to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Arena {
    /// Capture the persistent state
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            players: self.registry.iter().cloned().collect(),
            tournaments: self.tournaments.values().cloned().collect(),
            history: self.history.matches().to_vec(),
            results: self.history.tournaments().to_vec(),
        }
    }

    /// Replace all state with a snapshot, keeping config and collaborators.
    ///
    /// Terminal tournaments found in the snapshot are moved to history.
    pub fn load_snapshot(&mut self, snapshot: ArenaSnapshot) {
        self.registry =
            PlayerRegistry::from_profiles(self.config.starting_rating, snapshot.players);
        self.leaderboard = Leaderboard::build(&self.registry);

        let mut results = snapshot.results;
        self.tournaments.clear();
        for tournament in snapshot.tournaments {
            if tournament.status.is_terminal() {
                let finished_at = tournament.finished_at.unwrap_or(tournament.expires_at);
                results.push(summarize(&tournament, finished_at));
            } else {
                self.tournaments.insert(tournament.id.clone(), tournament);
            }
        }
        self.scheduler = ExpiryScheduler::from_tournaments(self.tournaments.values());
        self.history = MatchHistory::restore(
            self.config.history_limit,
            self.config.result_limit,
            snapshot.history,
            results,
        );

        info!(
            players = self.registry.len(),
            tournaments = self.tournaments.len(),
            "arena snapshot loaded"
        );
        self.emit(ArenaEvent::Loaded {
            players: self.registry.len(),
            tournaments: self.tournaments.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::registry::MatchOutcome;
    use crate::tier::TierId;
    use crate::tournament::TournamentStatus;

    fn populated() -> (Arena, String) {
        let mut arena = Arena::default().with_seed(4);
        for id in ["a", "b", "c", "d"] {
            arena.register(id);
        }
        arena.record_match(MatchOutcome::new("a", "b")).unwrap();
        let tid = arena.create_tournament("daily_1v1").unwrap().id;
        for id in ["a", "b", "c", "d"] {
            arena.register_for_tournament(&tid, id).unwrap();
        }
        arena.start_tournament(&tid).unwrap();
        (arena, tid)
    }

    #[test]
    fn test_snapshot_round_trip_through_json() {
        let (arena, tid) = populated();
        let snapshot = arena.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded = ArenaSnapshot::from_json(&json).unwrap();
        assert_eq!(decoded, snapshot);

        let mut restored = Arena::default().with_seed(4);
        restored.load_snapshot(decoded);
        assert_eq!(restored.registry().len(), 4);
        assert_eq!(restored.profile("a").unwrap().rating(), 1016);
        assert_eq!(restored.rank_of("a"), Some(1));
        assert_eq!(restored.history().matches().len(), 1);

        let tournament = restored.tournament(&tid).unwrap();
        assert_eq!(tournament.status, TournamentStatus::Active);
        assert_eq!(tournament.matches.len(), 2);
        assert_eq!(restored.next_expiry(), Some(tournament.expires_at));
    }

    #[test]
    fn test_restored_tournament_can_finish() {
        let (arena, tid) = populated();
        let mut restored = Arena::default().with_seed(8);
        restored.load_snapshot(arena.snapshot());

        for m in restored.pending_matches(&tid).unwrap() {
            restored.report_match_result(&m.match_id, &m.player1).unwrap();
        }
        restored.advance_round(&tid).unwrap();
        for m in restored.pending_matches(&tid).unwrap() {
            restored.report_match_result(&m.match_id, &m.player2).unwrap();
        }
        let outcome = restored.advance_round(&tid).unwrap();
        assert!(matches!(outcome, crate::RoundOutcome::Completed(_)));
    }

    #[test]
    fn test_load_recomputes_stale_tiers() {
        let (arena, _) = populated();
        let mut json: serde_json::Value = serde_json::to_value(arena.snapshot()).unwrap();
        for player in json["players"].as_array_mut().unwrap() {
            player["rating"] = serde_json::json!(3100);
            player["tier"] = serde_json::json!("bronze");
        }
        let snapshot: ArenaSnapshot = serde_json::from_value(json).unwrap();

        let mut restored = Arena::default();
        restored.load_snapshot(snapshot);
        assert_eq!(restored.profile("c").unwrap().tier(), TierId::Master);
        assert_eq!(restored.leaderboard().rows()[0].tier, TierId::Master);
    }

    #[test]
    fn test_load_trims_history_to_limit() {
        let mut arena = Arena::default();
        arena.register("x");
        arena.register("y");
        for _ in 0..30 {
            arena.record_match(MatchOutcome::new("x", "y")).unwrap();
        }
        let config = ArenaConfig {
            history_limit: 10,
            ..ArenaConfig::default()
        };
        let mut restored = Arena::new(config);
        restored.load_snapshot(arena.snapshot());
        assert_eq!(restored.history().matches().len(), 10);
    }

    #[test]
    fn test_rejects_future_version() {
        let (arena, _) = populated();
        let mut snapshot = arena.snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            ArenaSnapshot::from_json(&json),
            Err(PersistError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let (arena, _) = populated();
        let path =
            std::env::temp_dir().join(format!("arena_snapshot_{}.json", uuid::Uuid::new_v4()));
        arena.snapshot().save(&path).unwrap();
        let loaded = ArenaSnapshot::load(&path).unwrap();
        assert_eq!(loaded.players.len(), 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("arena_snapshot_missing_file.json");
        assert!(matches!(
            ArenaSnapshot::load(&path),
            Err(PersistError::Io { .. })
        ));
    }
}
