//! Engine configuration and tournament format templates

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::rating::{DEFAULT_RATING, K_FACTOR};
use crate::reward::RewardBundle;

/// Default rating tolerance for matchmaking
pub const DEFAULT_MATCH_WINDOW: i32 = 200;

/// Default number of match records kept in history
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Default number of finished tournaments kept in history
pub const DEFAULT_RESULT_LIMIT: usize = 50;

const DAY_SECS: i64 = 24 * 60 * 60;

/// Longest accepted tournament lifetime (one year)
pub const MAX_DURATION_SECS: i64 = 365 * DAY_SECS;

/// Arena engine configuration, usually loaded from `arena.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Rating given to newly registered players
    pub starting_rating: i32,
    /// K-factor for Elo updates
    pub k_factor: f64,
    /// Matchmaking accepts opponents within `rating ± match_window`
    pub match_window: i32,
    /// Match records kept; oldest are evicted first
    pub history_limit: usize,
    /// Finished tournaments kept
    pub result_limit: usize,
    /// Available tournament templates
    pub formats: Vec<TournamentFormat>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            starting_rating: DEFAULT_RATING,
            k_factor: K_FACTOR,
            match_window: DEFAULT_MATCH_WINDOW,
            history_limit: DEFAULT_HISTORY_LIMIT,
            result_limit: DEFAULT_RESULT_LIMIT,
            formats: default_formats(),
        }
    }
}

impl ArenaConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "k_factor must be positive, got {}",
                self.k_factor
            )));
        }
        if self.starting_rating < 0 {
            return Err(ConfigError::Invalid(format!(
                "starting_rating must not be negative, got {}",
                self.starting_rating
            )));
        }
        if self.match_window < 0 {
            return Err(ConfigError::Invalid(format!(
                "match_window must not be negative, got {}",
                self.match_window
            )));
        }
        if self.history_limit == 0 || self.result_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit and result_limit must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for format in &self.formats {
            if !seen.insert(format.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tournament format {}",
                    format.id
                )));
            }
            format.validate()?;
        }
        Ok(())
    }

    pub fn format(&self, id: &str) -> Option<&TournamentFormat> {
        self.formats.iter().find(|f| f.id == id)
    }
}

/// Template a tournament is instantiated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFormat {
    pub id: String,
    pub name: String,
    /// Team size label, e.g. "1v1" or "3v3"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Participant cap
    pub max_participants: usize,
    /// Lifetime from creation until the tournament expires
    pub duration_secs: i64,
    pub rewards: RewardTable,
}

fn default_mode() -> String {
    "1v1".to_string()
}

impl TournamentFormat {
    /// Lifetime, clamped to `1..=MAX_DURATION_SECS` for formats built in code
    /// without validation
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs.clamp(1, MAX_DURATION_SECS))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_participants < 2 {
            return Err(ConfigError::Invalid(format!(
                "format {} must allow at least 2 participants",
                self.id
            )));
        }
        if self.duration_secs <= 0 || self.duration_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "format {} duration must be between 1 and {} seconds, got {}",
                self.id, MAX_DURATION_SECS, self.duration_secs
            )));
        }
        if self.rewards.first.is_none() {
            return Err(ConfigError::Invalid(format!(
                "format {} has no first-place reward",
                self.id
            )));
        }
        Ok(())
    }
}

/// Placement rewards for a tournament format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    #[serde(default)]
    pub first: Option<RewardBundle>,
    #[serde(default)]
    pub second: Option<RewardBundle>,
    #[serde(default)]
    pub third: Option<RewardBundle>,
    /// Paid to every other finisher placed within the top `n`
    #[serde(default)]
    pub top_n: Option<TopNReward>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNReward {
    pub n: u32,
    pub reward: RewardBundle,
}

impl RewardTable {
    /// Reward for a finishing position, if the table pays one
    pub fn for_place(&self, place: u32) -> Option<&RewardBundle> {
        match place {
            1 => self.first.as_ref(),
            2 => self.second.as_ref(),
            3 => self.third.as_ref(),
            _ => self
                .top_n
                .as_ref()
                .filter(|top| place <= top.n)
                .map(|top| &top.reward),
        }
    }
}


/// Built-in tournament formats
pub fn default_formats() -> Vec<TournamentFormat> {
    vec![
        TournamentFormat {
            id: "daily_1v1".to_string(),
            name: "Daily Duel".to_string(),
            mode: "1v1".to_string(),
            max_participants: 64,
            duration_secs: DAY_SECS,
            rewards: RewardTable {
                first: Some(RewardBundle::new(10_000, 100).with_title("Daily Champion")),
                second: Some(RewardBundle::new(5_000, 50)),
                third: Some(RewardBundle::new(2_500, 25)),
                top_n: None,
            },
        },
        TournamentFormat {
            id: "weekly_team".to_string(),
            name: "Weekly Team Battle".to_string(),
            mode: "3v3".to_string(),
            max_participants: 32,
            duration_secs: 7 * DAY_SECS,
            rewards: RewardTable {
                first: Some(RewardBundle::new(50_000, 500).with_title("Team Champion")),
                second: Some(RewardBundle::new(25_000, 250)),
                third: Some(RewardBundle::new(12_500, 125)),
                top_n: None,
            },
        },
        TournamentFormat {
            id: "monthly_grand".to_string(),
            name: "Grand Tournament".to_string(),
            mode: "1v1".to_string(),
            max_participants: 128,
            duration_secs: 30 * DAY_SECS,
            rewards: RewardTable {
                first: Some(RewardBundle::new(500_000, 5_000).with_title("Grand Champion")),
                second: Some(RewardBundle::new(250_000, 2_500)),
                third: Some(RewardBundle::new(125_000, 1_250)),
                top_n: Some(TopNReward {
                    n: 8,
                    reward: RewardBundle::new(50_000, 500),
                }),
            },
        },
    ]
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
