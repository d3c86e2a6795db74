//! Arena profile: one per registered player

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::RATING_FLOOR;
use crate::tier::{tier_for, TierId};

/// Tournament participation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentCounters {
    pub participated: u32,
    pub wins: u32,
    pub top3: u32,
}

/// A player's ladder record
///
/// `rating` and `tier` are private so the tier can only change together with
/// the rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaProfile {
    pub player_id: String,
    rating: i32,
    tier: TierId,
    /// Highest tier ever reached, used to grant tier-up rewards once
    pub peak_tier: TierId,
    pub wins: u32,
    pub losses: u32,
    pub win_streak: u32,
    pub best_win_streak: u32,
    pub total_matches: u32,
    /// Informational; saturates instead of overflowing
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub tournaments: TournamentCounters,
    pub titles: Vec<String>,
    pub registered_at: DateTime<Utc>,
}

impl ArenaProfile {
    pub fn new(player_id: &str, rating: i32) -> Self {
        let rating = rating.max(RATING_FLOOR);
        let tier = tier_for(rating);
        Self {
            player_id: player_id.to_string(),
            rating,
            tier,
            peak_tier: tier,
            wins: 0,
            losses: 0,
            win_streak: 0,
            best_win_streak: 0,
            total_matches: 0,
            damage_dealt: 0,
            damage_taken: 0,
            tournaments: TournamentCounters::default(),
            titles: Vec::new(),
            registered_at: Utc::now(),
        }
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    pub fn tier(&self) -> TierId {
        self.tier
    }

    /// Set a new rating, clamped at the floor, and recompute the tier.
    ///
    /// Returns the new tier if it is above the previous peak.
    pub(crate) fn set_rating(&mut self, rating: i32) -> Option<TierId> {
        self.rating = rating.max(RATING_FLOOR);
        self.tier = tier_for(self.rating);
        if self.tier > self.peak_tier {
            self.peak_tier = self.tier;
            Some(self.tier)
        } else {
            None
        }
    }

    /// Recompute derived fields after deserialization
    pub(crate) fn refresh_derived(&mut self) {
        self.rating = self.rating.max(RATING_FLOOR);
        self.tier = tier_for(self.rating);
        self.peak_tier = self.peak_tier.max(self.tier);
    }

    pub(crate) fn record_win(&mut self, damage_dealt: u64, damage_taken: u64) {
        self.wins += 1;
        self.win_streak += 1;
        self.best_win_streak = self.best_win_streak.max(self.win_streak);
        self.total_matches += 1;
        self.damage_dealt = self.damage_dealt.saturating_add(damage_dealt);
        self.damage_taken = self.damage_taken.saturating_add(damage_taken);
    }

    pub(crate) fn record_loss(&mut self, damage_dealt: u64, damage_taken: u64) {
        self.losses += 1;
        self.win_streak = 0;
        self.total_matches += 1;
        self.damage_dealt = self.damage_dealt.saturating_add(damage_dealt);
        self.damage_taken = self.damage_taken.saturating_add(damage_taken);
    }

    /// Win percentage, 0 when no matches have been played
    pub fn win_rate(&self) -> f64 {
        if self.total_matches == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total_matches as f64 * 100.0
    }
}
