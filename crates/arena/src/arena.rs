//! The arena engine: registry, ladder, matchmaking and history behind one API
//!
//! Every operation runs to completion on `&mut self`. For concurrent callers
//! wrap the engine in [`crate::SharedArena`].

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::events::{ArenaEvent, EventSink, NullSink};
use crate::history::{MatchHistory, MatchRecord};
use crate::leaderboard::{Leaderboard, LeaderboardRow};
use crate::matchmaker::Matchmaker;
use crate::profile::ArenaProfile;
use crate::rating::expected_score;
use crate::registry::{MatchOutcome, PlayerRegistry};
use crate::reward::{DiscardRewards, RewardIntent, RewardReason, RewardSink};
use crate::schedule::ExpiryScheduler;
use crate::tournament::Tournament;

pub struct Arena {
    pub(crate) config: ArenaConfig,
    pub(crate) registry: PlayerRegistry,
    pub(crate) leaderboard: Leaderboard,
    pub(crate) matchmaker: Matchmaker,
    pub(crate) history: MatchHistory,
    pub(crate) tournaments: BTreeMap<String, Tournament>,
    pub(crate) scheduler: ExpiryScheduler,
    pub(crate) rng: StdRng,
    events: Box<dyn EventSink>,
    rewards: Box<dyn RewardSink>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            registry: PlayerRegistry::new(config.starting_rating),
            leaderboard: Leaderboard::default(),
            matchmaker: Matchmaker::new(config.match_window),
            history: MatchHistory::new(config.history_limit, config.result_limit),
            tournaments: BTreeMap::new(),
            scheduler: ExpiryScheduler::new(),
            rng: StdRng::from_entropy(),
            events: Box::new(NullSink),
            rewards: Box::new(DiscardRewards),
            config,
        }
    }

    /// Deliver domain events to `sink`
    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Box::new(sink);
        self
    }

    /// Deliver reward intents to `sink`
    pub fn with_rewards(mut self, sink: impl RewardSink + 'static) -> Self {
        self.rewards = Box::new(sink);
        self
    }

    /// Use a deterministic random source for shuffles, matchmaking and simulation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Register a player; an existing profile is returned unchanged
    pub fn register(&mut self, player_id: &str) -> ArenaProfile {
        let (profile, created) = self.registry.register(player_id);
        let profile = profile.clone();
        if created {
            self.leaderboard.rebuild(&self.registry);
            debug!(player = player_id, rating = profile.rating(), "player registered");
            self.emit(ArenaEvent::PlayerRegistered {
                profile: profile.clone(),
            });
        }
        profile
    }

    pub fn profile(&self, player_id: &str) -> Option<&ArenaProfile> {
        self.registry.get(player_id)
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    // =========================================================================
    // Matchmaking and standalone matches
    // =========================================================================

    /// Find an opponent within the rating window.
    ///
    /// `Ok(None)` is the normal "nobody in range, try later" answer.
    pub fn find_match(&mut self, player_id: &str) -> Result<Option<ArenaProfile>> {
        let opponent = self
            .matchmaker
            .find_match(&self.registry, player_id, &mut self.rng)?
            .cloned();

        match &opponent {
            Some(opponent) => {
                debug!(player = player_id, opponent = %opponent.player_id, "match found");
                let player = self.registry.require(player_id)?.clone();
                self.emit(ArenaEvent::MatchFound {
                    player,
                    opponent: opponent.clone(),
                });
            }
            None => debug!(player = player_id, "no opponent in rating window"),
        }
        Ok(opponent)
    }

    /// Record an externally resolved 1v1 result
    pub fn record_match(&mut self, outcome: MatchOutcome) -> Result<MatchRecord> {
        let match_id = format!("match_{}", Uuid::new_v4().simple());
        let (player1, player2) = (outcome.winner.clone(), outcome.loser.clone());
        self.resolve(&outcome, &player1, &player2, match_id, None)
    }

    /// Roll a winner from the players' expected scores and record it
    pub fn simulate_battle(&mut self, player1: &str, player2: &str) -> Result<MatchRecord> {
        let outcome = self.roll_outcome(player1, player2)?;
        let match_id = format!("match_{}", Uuid::new_v4().simple());
        self.resolve(&outcome, player1, player2, match_id, None)
    }

    pub(crate) fn roll_outcome(&mut self, player1: &str, player2: &str) -> Result<MatchOutcome> {
        if player1 == player2 {
            return Err(ArenaError::SelfMatch(player1.to_string()));
        }
        let r1 = self.registry.require(player1)?.rating();
        let r2 = self.registry.require(player2)?.rating();
        let p1_wins = self.rng.gen::<f64>() < expected_score(r1, r2);
        Ok(if p1_wins {
            MatchOutcome::new(player1, player2)
        } else {
            MatchOutcome::new(player2, player1)
        })
    }

    /// Shared path for every decided match: rating update, leaderboard,
    /// history, events, tier-up rewards
    pub(crate) fn resolve(
        &mut self,
        outcome: &MatchOutcome,
        player1: &str,
        player2: &str,
        match_id: String,
        tournament_id: Option<&str>,
    ) -> Result<MatchRecord> {
        let applied = self.registry.apply_outcome(outcome, self.config.k_factor)?;
        self.leaderboard.rebuild(&self.registry);

        let record = MatchRecord {
            match_id,
            player1: player1.to_string(),
            player2: player2.to_string(),
            winner: outcome.winner.clone(),
            loser: outcome.loser.clone(),
            timestamp: Utc::now(),
            delta: applied.update.delta,
            winner_rating: applied.update.winner_rating,
            loser_rating: applied.update.loser_rating,
            tournament_id: tournament_id.map(str::to_string),
        };
        self.history.record(record.clone());

        debug!(
            match_id = %record.match_id,
            winner = %record.winner,
            loser = %record.loser,
            delta = applied.update.delta.winner,
            winner_rating = record.winner_rating,
            loser_rating = record.loser_rating,
            "match recorded"
        );
        self.emit(ArenaEvent::MatchCompleted {
            record: record.clone(),
            delta: applied.update.delta,
        });

        for change in applied.tier_changes {
            info!(player = %change.player_id, from = %change.from, to = %change.to, "tier changed");
            if change.new_peak {
                self.grant(RewardIntent {
                    player_id: change.player_id.clone(),
                    reward: change.to.info().reward(),
                    reason: RewardReason::TierUp { tier: change.to },
                });
            }
            self.emit(ArenaEvent::TierChanged { change });
        }

        Ok(record)
    }

    // =========================================================================
    // Leaderboard and history
    // =========================================================================

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn top_n(&self, n: usize) -> &[LeaderboardRow] {
        self.leaderboard.top_n(n)
    }

    pub fn rank_of(&self, player_id: &str) -> Option<usize> {
        self.leaderboard.rank_of(player_id)
    }

    pub fn history(&self) -> &MatchHistory {
        &self.history
    }

    // =========================================================================
    // Outbound collaborators
    // =========================================================================

    pub(crate) fn emit(&self, event: ArenaEvent) {
        self.events.emit(event);
    }

    pub(crate) fn grant(&self, intent: RewardIntent) {
        debug!(player = %intent.player_id, gold = intent.reward.gold, "reward intent");
        self.rewards.grant(&intent);
        self.emit(ArenaEvent::Reward { intent });
    }
}

#[cfg(test)]
#[path = "arena_tests.rs"]
mod arena_tests;
