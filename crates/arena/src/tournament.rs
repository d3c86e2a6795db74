//! Single-elimination tournament brackets
//!
//! This module holds the tournament data model and the pure bracket logic
//! (pairing, byes, survivors, standings). Lifecycle operations that touch the
//! ladder live in `orchestrator`.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TournamentFormat;

/// Tournament lifecycle: `Registration -> Active -> Complete`, or
/// `Cancelled` from either of the first two. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Registration,
    Active,
    Complete,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Complete | TournamentStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Registration => "registration",
            TournamentStatus::Active => "active",
            TournamentStatus::Complete => "complete",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pairing inside one bracket round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub match_id: String,
    pub round: u32,
    pub player1: String,
    pub player2: String,
    pub winner: Option<String>,
    pub completed: bool,
}

impl BracketMatch {
    pub fn involves(&self, player_id: &str) -> bool {
        self.player1 == player_id || self.player2 == player_id
    }

    /// The other player in this match
    pub fn opponent_of(&self, player_id: &str) -> Option<&str> {
        if self.player1 == player_id {
            Some(self.player2.as_str())
        } else if self.player2 == player_id {
            Some(self.player1.as_str())
        } else {
            None
        }
    }

    pub fn loser(&self) -> Option<&str> {
        self.winner.as_deref().and_then(|w| self.opponent_of(w))
    }
}

/// A participant left unpaired in a round; they advance automatically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bye {
    pub round: u32,
    pub player_id: String,
}

/// Final position of one entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: String,
    /// 1 = champion; players knocked out in the same round share a place
    pub place: u32,
    /// Round the player lost in, `None` for the champion
    pub eliminated_in: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub format: TournamentFormat,
    /// Everyone who entered, in registration order
    pub entrants: Vec<String>,
    /// Players still alive at the current round
    pub participants: Vec<String>,
    pub matches: Vec<BracketMatch>,
    #[serde(default)]
    pub byes: Vec<Bye>,
    /// 0 during registration, then 1-based
    pub current_round: u32,
    pub status: TournamentStatus,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn new(id: String, format: TournamentFormat, now: DateTime<Utc>) -> Self {
        let expires_at = now
            .checked_add_signed(format.duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            id,
            format,
            entrants: Vec::new(),
            participants: Vec::new(),
            matches: Vec::new(),
            byes: Vec::new(),
            current_round: 0,
            status: TournamentStatus::Registration,
            winner: None,
            created_at: now,
            started_at: None,
            expires_at,
            finished_at: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.entrants.len() >= self.format.max_participants
    }

    pub fn has_entrant(&self, player_id: &str) -> bool {
        self.entrants.iter().any(|p| p == player_id)
    }

    pub fn round_matches(&self, round: u32) -> impl Iterator<Item = &BracketMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    /// Unfinished matches in the current round
    pub fn pending_matches(&self) -> Vec<&BracketMatch> {
        self.round_matches(self.current_round)
            .filter(|m| !m.completed)
            .collect()
    }

    pub fn bye_in_round(&self, round: u32) -> Option<&Bye> {
        self.byes.iter().find(|b| b.round == round)
    }

    pub fn find_match(&self, match_id: &str) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.match_id == match_id)
    }

    pub(crate) fn find_match_mut(&mut self, match_id: &str) -> Option<&mut BracketMatch> {
        self.matches.iter_mut().find(|m| m.match_id == match_id)
    }

    /// Shuffle the current participants (Fisher-Yates) and pair neighbours.
    ///
    /// With an odd count the last player after shuffling gets the bye.
    pub(crate) fn generate_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order = self.participants.clone();
        order.shuffle(rng);

        let round = self.current_round;
        let mut pairs = order.chunks_exact(2);
        for (index, pair) in pairs.by_ref().enumerate() {
            self.matches.push(BracketMatch {
                match_id: format!("{}_r{}_{}", self.id, round, index),
                round,
                player1: pair[0].clone(),
                player2: pair[1].clone(),
                winner: None,
                completed: false,
            });
        }
        if let [odd] = pairs.remainder() {
            self.byes.push(Bye {
                round,
                player_id: odd.clone(),
            });
        }
    }

    /// Players advancing out of `round`: match winners, then the bye
    pub fn round_survivors(&self, round: u32) -> Vec<String> {
        let mut survivors: Vec<String> = self
            .round_matches(round)
            .filter_map(|m| m.winner.clone())
            .collect();
        if let Some(bye) = self.bye_in_round(round) {
            survivors.push(bye.player_id.clone());
        }
        survivors
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Final positions derived from the bracket.
    ///
    /// A player knocked out in round `r` finishes at `1 + survivors(r)`, so
    /// the final's loser is 2nd and both semi-final losers are 3rd. Entrants
    /// who never lost are only ranked once a champion exists.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings = Vec::with_capacity(self.entrants.len());
        if let Some(champion) = &self.winner {
            standings.push(Standing {
                player_id: champion.clone(),
                place: 1,
                eliminated_in: None,
            });
        }

        for round in (1..=self.current_round).rev() {
            let place = self.round_survivors(round).len() as u32 + 1;
            let mut losers: Vec<&str> = self
                .round_matches(round)
                .filter_map(BracketMatch::loser)
                .collect();
            losers.sort_unstable();
            standings.extend(losers.into_iter().map(|player_id| Standing {
                player_id: player_id.to_string(),
                place,
                eliminated_in: Some(round),
            }));
        }
        standings
    }
}

#[cfg(test)]
#[path = "tournament_tests.rs"]
mod tournament_tests;
