//! Append-only match and tournament history with bounded retention

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::rating::RatingDelta;
use crate::tournament::{Standing, TournamentStatus};

/// Record of one resolved 1v1 match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,
    pub player1: String,
    pub player2: String,
    pub winner: String,
    pub loser: String,
    pub timestamp: DateTime<Utc>,
    pub delta: RatingDelta,
    /// Winner's rating after the update
    pub winner_rating: i32,
    /// Loser's rating after the update
    pub loser_rating: i32,
    /// Tournament the match belonged to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<String>,
}

/// Final record of a finished (completed or cancelled) tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub tournament_id: String,
    pub format_id: String,
    pub status: TournamentStatus,
    pub champion: Option<String>,
    pub standings: Vec<Standing>,
    pub participants: usize,
    pub match_count: usize,
    pub rounds: u32,
    pub finished_at: DateTime<Utc>,
}

/// Bounded FIFO log: once full, the oldest entry is evicted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn from_entries(capacity: usize, entries: Vec<T>) -> Self {
        let mut log = Self::new(capacity);
        for entry in entries {
            log.push(entry);
        }
        log
    }

    pub fn push(&mut self, entry: T) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter()
    }

    /// The `n` newest entries, newest first
    pub fn recent(&self, n: usize) -> Vec<&T> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> BoundedLog<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

/// Completed matches and finished tournaments
#[derive(Debug, Clone)]
pub struct MatchHistory {
    matches: BoundedLog<MatchRecord>,
    tournaments: BoundedLog<TournamentSummary>,
}

impl MatchHistory {
    pub fn new(match_limit: usize, result_limit: usize) -> Self {
        Self {
            matches: BoundedLog::new(match_limit),
            tournaments: BoundedLog::new(result_limit),
        }
    }

    pub fn restore(
        match_limit: usize,
        result_limit: usize,
        matches: Vec<MatchRecord>,
        tournaments: Vec<TournamentSummary>,
    ) -> Self {
        Self {
            matches: BoundedLog::from_entries(match_limit, matches),
            tournaments: BoundedLog::from_entries(result_limit, tournaments),
        }
    }

    pub fn record(&mut self, record: MatchRecord) {
        self.matches.push(record);
    }

    pub fn record_tournament(&mut self, summary: TournamentSummary) {
        self.tournaments.push(summary);
    }

    pub fn matches(&self) -> &BoundedLog<MatchRecord> {
        &self.matches
    }

    pub fn tournaments(&self) -> &BoundedLog<TournamentSummary> {
        &self.tournaments
    }

    /// Matches a player took part in, newest first
    pub fn for_player(&self, player_id: &str) -> Vec<&MatchRecord> {
        self.matches
            .iter()
            .rev()
            .filter(|m| m.player1 == player_id || m.player2 == player_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: usize) -> MatchRecord {
        MatchRecord {
            match_id: format!("m{}", id),
            player1: "a".to_string(),
            player2: if id % 2 == 0 { "b" } else { "c" }.to_string(),
            winner: "a".to_string(),
            loser: if id % 2 == 0 { "b" } else { "c" }.to_string(),
            timestamp: Utc::now(),
            delta: RatingDelta { winner: 16, loser: -16 },
            winner_rating: 1016,
            loser_rating: 984,
            tournament_id: None,
        }
    }

    #[test]
    fn test_bounded_log_evicts_oldest_first() {
        let mut log = BoundedLog::new(3);
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.to_vec(), vec![2, 3, 4]);
        assert_eq!(log.recent(2), vec![&4, &3]);
        assert_eq!(log.capacity(), 3);
    }

    #[test]
    fn test_from_entries_keeps_newest_tail() {
        let log = BoundedLog::from_entries(2, vec!["old", "mid", "new"]);
        assert_eq!(log.to_vec(), vec!["mid", "new"]);
    }

    #[test]
    fn test_zero_capacity_is_bumped_to_one() {
        let mut log = BoundedLog::new(0);
        log.push(1);
        log.push(2);
        assert_eq!(log.to_vec(), vec![2]);
    }

    #[test]
    fn test_history_for_player() {
        let mut history = MatchHistory::new(10, 5);
        for i in 0..4 {
            history.record(record(i));
        }
        let for_b: Vec<_> = history.for_player("b").iter().map(|m| m.match_id.clone()).collect();
        assert_eq!(for_b, vec!["m2", "m0"]);
        assert_eq!(history.for_player("a").len(), 4);
        assert!(history.for_player("z").is_empty());
    }

    #[test]
    fn test_history_respects_match_limit() {
        let mut history = MatchHistory::new(2, 5);
        for i in 0..6 {
            history.record(record(i));
        }
        assert_eq!(history.matches().len(), 2);
        assert_eq!(history.matches().recent(1)[0].match_id, "m5");
    }
}
