//! Reward bundles and reward intents
//!
//! The engine never touches player inventories or currency. It hands a
//! [`RewardIntent`] to a [`RewardSink`] and lets the economy decide.

use serde::{Deserialize, Serialize};

use crate::tier::TierId;

/// Currency, arena points and an optional title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBundle {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub arena_points: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RewardBundle {
    pub fn new(gold: u64, arena_points: u64) -> Self {
        Self {
            gold,
            arena_points,
            title: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Why a reward was granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardReason {
    /// Finishing position in a completed tournament (1 = champion)
    Placement { tournament_id: String, place: u32 },
    /// First time reaching a rank tier
    TierUp { tier: TierId },
}

/// Declarative instruction to grant a reward to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardIntent {
    pub player_id: String,
    pub reward: RewardBundle,
    pub reason: RewardReason,
}

/// Receiver of reward intents, resolved when the engine is built
pub trait RewardSink: Send + Sync {
    fn grant(&self, intent: &RewardIntent);
}

/// Discards every intent
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardRewards;

impl RewardSink for DiscardRewards {
    fn grant(&self, _intent: &RewardIntent) {}
}
