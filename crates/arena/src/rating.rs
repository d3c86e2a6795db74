//! Elo rating calculation
//!
//! Pure functions only. Applying the result to profiles is the registry's job.

use serde::{Deserialize, Serialize};

/// Default starting rating for newly registered players
pub const DEFAULT_RATING: i32 = 1000;

/// K-factor for rating updates (higher = more volatile)
pub const K_FACTOR: f64 = 32.0;

/// Lowest rating a profile can hold
pub const RATING_FLOOR: i32 = 0;

/// Rating change produced by one decided match, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDelta {
    /// Non-negative change for the winner
    pub winner: i32,
    /// Non-positive change for the loser
    pub loser: i32,
}

/// Ratings of both players after a delta has been applied and clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub delta: RatingDelta,
    pub winner_rating: i32,
    pub loser_rating: i32,
}

/// Calculate expected score for a player rated `rating` against `opponent`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) as f64 / 400.0))
}

/// Compute the rounded deltas for `winner_rating` beating `loser_rating`.
///
/// `f64::round` rounds half away from zero, so the two deltas always have
/// equal magnitude.
pub fn compute_deltas(winner_rating: i32, loser_rating: i32, k_factor: f64) -> RatingDelta {
    let expected_winner = expected_score(winner_rating, loser_rating);
    let expected_loser = 1.0 - expected_winner;

    RatingDelta {
        winner: (k_factor * (1.0 - expected_winner)).round() as i32,
        loser: (k_factor * (0.0 - expected_loser)).round() as i32,
    }
}

/// Apply the Elo update and clamp both ratings at [`RATING_FLOOR`].
///
/// Clamping can break zero-sum for a loser already near the floor: the
/// winner still gains the full delta while the loser loses less.
pub fn update_ratings(winner_rating: i32, loser_rating: i32, k_factor: f64) -> RatingUpdate {
    let delta = compute_deltas(winner_rating, loser_rating, k_factor);
    RatingUpdate {
        delta,
        winner_rating: winner_rating.saturating_add(delta.winner).max(RATING_FLOOR),
        loser_rating: loser_rating.saturating_add(delta.loser).max(RATING_FLOOR),
    }
}

#[cfg(test)]
#[path = "rating_tests.rs"]
mod rating_tests;
