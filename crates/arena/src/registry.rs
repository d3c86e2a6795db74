//! Player registry: owns every arena profile

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ArenaError, Result};
use crate::profile::ArenaProfile;
use crate::rating::{update_ratings, RatingUpdate};
use crate::tier::TierId;

/// A decided 1v1 result handed in by the combat resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: String,
    pub loser: String,
    /// Damage dealt by the winner (informational)
    #[serde(default)]
    pub winner_damage: u64,
    /// Damage dealt by the loser (informational)
    #[serde(default)]
    pub loser_damage: u64,
}

impl MatchOutcome {
    pub fn new(winner: &str, loser: &str) -> Self {
        Self {
            winner: winner.to_string(),
            loser: loser.to_string(),
            winner_damage: 0,
            loser_damage: 0,
        }
    }

    pub fn with_damage(mut self, winner_damage: u64, loser_damage: u64) -> Self {
        self.winner_damage = winner_damage;
        self.loser_damage = loser_damage;
        self
    }
}

/// Tier movement caused by a rating change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChange {
    pub player_id: String,
    pub from: TierId,
    pub to: TierId,
    /// True the first time the player reaches `to`
    pub new_peak: bool,
}

/// Effect of applying one outcome to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMatch {
    pub update: RatingUpdate,
    pub tier_changes: Vec<TierChange>,
}

/// Id -> profile store
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    profiles: BTreeMap<String, ArenaProfile>,
    starting_rating: i32,
}

impl PlayerRegistry {
    pub fn new(starting_rating: i32) -> Self {
        Self {
            profiles: BTreeMap::new(),
            starting_rating,
        }
    }

    /// Rebuild a registry from stored profiles, recomputing derived fields
    pub fn from_profiles(starting_rating: i32, profiles: Vec<ArenaProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|mut profile| {
                profile.refresh_derived();
                (profile.player_id.clone(), profile)
            })
            .collect();
        Self {
            profiles,
            starting_rating,
        }
    }

    /// Register a player. Existing profiles are returned untouched.
    ///
    /// The flag is true when a new profile was created.
    pub fn register(&mut self, player_id: &str) -> (&ArenaProfile, bool) {
        let mut created = false;
        let starting_rating = self.starting_rating;
        let profile = self
            .profiles
            .entry(player_id.to_string())
            .or_insert_with(|| {
                created = true;
                ArenaProfile::new(player_id, starting_rating)
            });
        (profile, created)
    }

    pub fn get(&self, player_id: &str) -> Option<&ArenaProfile> {
        self.profiles.get(player_id)
    }

    pub(crate) fn get_mut(&mut self, player_id: &str) -> Result<&mut ArenaProfile> {
        self.profiles
            .get_mut(player_id)
            .ok_or_else(|| ArenaError::PlayerNotFound(player_id.to_string()))
    }

    pub fn require(&self, player_id: &str) -> Result<&ArenaProfile> {
        self.get(player_id)
            .ok_or_else(|| ArenaError::PlayerNotFound(player_id.to_string()))
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.profiles.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Profiles in player id order
    pub fn iter(&self) -> impl Iterator<Item = &ArenaProfile> {
        self.profiles.values()
    }

    /// Apply an Elo update and the win/loss statistics for one outcome.
    ///
    /// Both ratings are read before either is written.
    pub fn apply_outcome(&mut self, outcome: &MatchOutcome, k_factor: f64) -> Result<AppliedMatch> {
        if outcome.winner == outcome.loser {
            return Err(ArenaError::SelfMatch(outcome.winner.clone()));
        }
        let winner_before = self.require(&outcome.winner)?.clone();
        let loser_before = self.require(&outcome.loser)?.clone();

        let update = update_ratings(winner_before.rating(), loser_before.rating(), k_factor);
        let mut tier_changes = Vec::new();

        let winner = self.get_mut(&outcome.winner)?;
        let winner_peak = winner.set_rating(update.winner_rating);
        winner.record_win(outcome.winner_damage, outcome.loser_damage);
        push_tier_change(&mut tier_changes, &winner_before, winner.tier(), winner_peak);

        let loser = self.get_mut(&outcome.loser)?;
        let loser_peak = loser.set_rating(update.loser_rating);
        loser.record_loss(outcome.loser_damage, outcome.winner_damage);
        push_tier_change(&mut tier_changes, &loser_before, loser.tier(), loser_peak);

        Ok(AppliedMatch {
            update,
            tier_changes,
        })
    }
}

fn push_tier_change(
    changes: &mut Vec<TierChange>,
    before: &ArenaProfile,
    after: TierId,
    new_peak: Option<TierId>,
) {
    if before.tier() != after {
        changes.push(TierChange {
            player_id: before.player_id.clone(),
            from: before.tier(),
            to: after,
            new_peak: new_peak.is_some(),
        });
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
