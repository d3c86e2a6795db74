//! Expiry tasks for open tournaments
//!
//! Tasks are plain data keyed by tournament id, so they can be cancelled
//! when a tournament finishes and rebuilt from `expires_at` after a restart.
//! Nothing fires on its own: the host calls `Arena::expire_due` on its tick.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::tournament::Tournament;

#[derive(Debug, Clone, Default)]
pub struct ExpiryScheduler {
    tasks: BTreeMap<String, DateTime<Utc>>,
}

impl ExpiryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// One task per non-terminal tournament
    pub fn from_tournaments<'a>(tournaments: impl IntoIterator<Item = &'a Tournament>) -> Self {
        let mut scheduler = Self::new();
        for tournament in tournaments {
            if !tournament.status.is_terminal() {
                scheduler.schedule(&tournament.id, tournament.expires_at);
            }
        }
        scheduler
    }

    /// Schedule or reschedule expiry for a tournament
    pub fn schedule(&mut self, tournament_id: &str, at: DateTime<Utc>) {
        self.tasks.insert(tournament_id.to_string(), at);
    }

    /// Returns false if no task was scheduled
    pub fn cancel(&mut self, tournament_id: &str) -> bool {
        self.tasks.remove(tournament_id).is_some()
    }

    pub fn deadline(&self, tournament_id: &str) -> Option<DateTime<Utc>> {
        self.tasks.get(tournament_id).copied()
    }

    /// Ids whose deadline is at or before `now`, earliest first
    pub fn due(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut due: Vec<_> = self
            .tasks
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, at)| (*at, id.clone()))
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.tasks.values().min().copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
