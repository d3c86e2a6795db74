//! Rank tiers
//!
//! Tiers are a pure function of rating. Profiles cache the result, but it is
//! recomputed on every rating change and on snapshot load.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reward::RewardBundle;

/// Identifier of a rank tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierId {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
    Legend,
    Mythic,
}

/// One row of the tier table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub id: TierId,
    pub name: &'static str,
    /// Inclusive lower bound
    pub min_rating: i32,
    /// Inclusive upper bound
    pub max_rating: i32,
    pub gold: u64,
    pub arena_points: u64,
}

impl Tier {
    pub fn contains(&self, rating: i32) -> bool {
        rating >= self.min_rating && rating <= self.max_rating
    }

    /// Reward granted when a player first reaches this tier
    pub fn reward(&self) -> RewardBundle {
        RewardBundle::new(self.gold, self.arena_points)
    }
}

const fn tier(
    id: TierId,
    name: &'static str,
    min_rating: i32,
    max_rating: i32,
    gold: u64,
    arena_points: u64,
) -> Tier {
    Tier {
        id,
        name,
        min_rating,
        max_rating,
        gold,
        arena_points,
    }
}

/// Tier table, ascending, contiguous from 0 to `i32::MAX`
pub const TIERS: [Tier; 10] = [
    tier(TierId::Bronze, "Bronze", 0, 999, 100, 5),
    tier(TierId::Silver, "Silver", 1000, 1499, 500, 10),
    tier(TierId::Gold, "Gold", 1500, 1999, 1000, 20),
    tier(TierId::Platinum, "Platinum", 2000, 2499, 2000, 40),
    tier(TierId::Diamond, "Diamond", 2500, 2999, 5000, 75),
    tier(TierId::Master, "Master", 3000, 3499, 10_000, 150),
    tier(TierId::Grandmaster, "Grandmaster", 3500, 3999, 20_000, 300),
    tier(TierId::Challenger, "Challenger", 4000, 4499, 40_000, 500),
    tier(TierId::Legend, "Legend", 4500, 4999, 80_000, 800),
    tier(TierId::Mythic, "Mythic", 5000, i32::MAX, 150_000, 1500),
];

/// Tier containing `rating`, falling back to the lowest tier
pub fn tier_for(rating: i32) -> TierId {
    TIERS
        .iter()
        .find(|tier| tier.contains(rating))
        .map(|tier| tier.id)
        .unwrap_or(TierId::Bronze)
}

impl TierId {
    /// Full table row for this tier
    pub fn info(self) -> &'static Tier {
        // Table order matches declaration order of the enum
        &TIERS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "tier_tests.rs"]
mod tier_tests;
