//! Competitive ranking and tournament engine
//!
//! This crate provides:
//! - A player registry with Elo ratings and rank tiers
//! - Rating-window matchmaking and a ranked leaderboard
//! - Single-elimination tournaments with placement rewards
//! - Bounded match history and JSON snapshots
//!
//! # Usage
//!
//! ```
//! use arena::{Arena, MatchOutcome};
//!
//! let mut arena = Arena::default();
//! arena.register("alice");
//! arena.register("bob");
//! let record = arena.record_match(MatchOutcome::new("alice", "bob")).unwrap();
//! assert_eq!(record.winner_rating, 1016);
//! assert_eq!(arena.rank_of("alice"), Some(1));
//! ```

mod arena;
mod config;
mod error;
mod events;
mod history;
mod leaderboard;
mod matchmaker;
mod orchestrator;
mod profile;
mod rating;
mod registry;
mod reward;
mod schedule;
mod shared;
mod snapshot;
mod tier;
mod tournament;

pub use arena::Arena;
pub use config::{
    default_formats, ArenaConfig, RewardTable, TopNReward, TournamentFormat, DEFAULT_HISTORY_LIMIT,
    DEFAULT_MATCH_WINDOW, DEFAULT_RESULT_LIMIT, MAX_DURATION_SECS,
};
pub use error::{ArenaError, ConfigError, ErrorKind, PersistError, Result};
pub use events::{ArenaEvent, ChannelSink, EventSink, NullSink, RecordingSink};
pub use history::{BoundedLog, MatchHistory, MatchRecord, TournamentSummary};
pub use leaderboard::{Leaderboard, LeaderboardRow};
pub use matchmaker::Matchmaker;
pub use orchestrator::RoundOutcome;
pub use profile::{ArenaProfile, TournamentCounters};
pub use rating::{
    compute_deltas, expected_score, update_ratings, RatingDelta, RatingUpdate, DEFAULT_RATING,
    K_FACTOR, RATING_FLOOR,
};
pub use registry::{AppliedMatch, MatchOutcome, PlayerRegistry, TierChange};
pub use reward::{DiscardRewards, RewardBundle, RewardIntent, RewardReason, RewardSink};
pub use schedule::ExpiryScheduler;
pub use shared::SharedArena;
pub use snapshot::{ArenaSnapshot, SNAPSHOT_VERSION};
pub use tier::{tier_for, Tier, TierId, TIERS};
pub use tournament::{BracketMatch, Bye, Standing, Tournament, TournamentStatus};
