//! Rating-sorted view of the registry

use serde::{Deserialize, Serialize};

use crate::registry::PlayerRegistry;
use crate::tier::TierId;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// 1-based position
    pub rank: usize,
    pub player_id: String,
    pub rating: i32,
    pub tier: TierId,
    pub wins: u32,
    pub losses: u32,
    /// Win percentage
    pub win_rate: f64,
}

/// Derived ordering of all profiles, rebuilt after every rating change
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    pub fn build(registry: &PlayerRegistry) -> Self {
        let mut leaderboard = Self::default();
        leaderboard.rebuild(registry);
        leaderboard
    }

    /// Full re-sort: rating descending, ties by player id ascending
    pub fn rebuild(&mut self, registry: &PlayerRegistry) {
        let mut profiles: Vec<_> = registry.iter().collect();
        profiles.sort_by(|a, b| {
            b.rating()
                .cmp(&a.rating())
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        self.rows = profiles
            .into_iter()
            .enumerate()
            .map(|(index, profile)| LeaderboardRow {
                rank: index + 1,
                player_id: profile.player_id.clone(),
                rating: profile.rating(),
                tier: profile.tier(),
                wins: profile.wins,
                losses: profile.losses,
                win_rate: profile.win_rate(),
            })
            .collect();
    }

    pub fn top_n(&self, n: usize) -> &[LeaderboardRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// 1-based rank of a player
    pub fn rank_of(&self, player_id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.player_id == player_id)
            .map(|index| index + 1)
    }

    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format the leaderboard as a text table
    pub fn render(&self, limit: usize) -> String {
        let mut out = String::new();
        out.push_str("=== Arena Leaderboard ===\n");
        out.push_str(&format!(
            "{:>4} {:<24} {:>7} {:<12} {:>6} {:>6} {:>7}\n",
            "#", "Player", "Rating", "Tier", "W", "L", "Win%"
        ));
        out.push_str(&"-".repeat(72));
        out.push('\n');
        for row in self.top_n(limit) {
            out.push_str(&format!(
                "{:>4} {:<24} {:>7} {:<12} {:>6} {:>6} {:>6.1}%\n",
                row.rank,
                row.player_id,
                row.rating,
                row.tier.name(),
                row.wins,
                row.losses,
                row.win_rate
            ));
        }
        out
    }
}

#[cfg(test)]
#[path = "leaderboard_tests.rs"]
mod leaderboard_tests;
