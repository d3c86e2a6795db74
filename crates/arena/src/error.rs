//! Error types for the arena engine
//!
//! Every failure here is an expected business condition and is returned to
//! the caller. "No opponent in range" is not an error at all; the matchmaker
//! reports it as `Ok(None)`.

use thiserror::Error;

use crate::tournament::TournamentStatus;

/// Coarse classification of an [`ArenaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown player, tournament, match or format id
    NotFound,
    /// Operation is not valid in the current lifecycle state
    InvalidState,
    /// Participant cap reached
    Capacity,
}

/// Recoverable errors returned by arena operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("player {0} is not registered")]
    PlayerNotFound(String),

    #[error("tournament {0} not found")]
    TournamentNotFound(String),

    #[error("match {0} not found")]
    MatchNotFound(String),

    #[error("unknown tournament format {0}")]
    FormatNotFound(String),

    #[error("tournament {tournament} is {actual}, expected {expected}")]
    WrongStatus {
        tournament: String,
        actual: TournamentStatus,
        expected: TournamentStatus,
    },

    #[error("player {player} already entered tournament {tournament}")]
    AlreadyEntered { tournament: String, player: String },

    #[error("round {round} of tournament {tournament} has {pending} unfinished matches")]
    RoundIncomplete {
        tournament: String,
        round: u32,
        pending: usize,
    },

    #[error("match {0} already has a result")]
    MatchAlreadyCompleted(String),

    #[error("player {player} is not playing in match {match_id}")]
    NotAParticipant { match_id: String, player: String },

    #[error("tournament {tournament} needs at least 2 participants, has {count}")]
    NotEnoughParticipants { tournament: String, count: usize },

    #[error("player {0} cannot play against themselves")]
    SelfMatch(String),

    #[error("tournament {tournament} is full ({max} participants)")]
    TournamentFull { tournament: String, max: usize },
}

impl ArenaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArenaError::PlayerNotFound(_)
            | ArenaError::TournamentNotFound(_)
            | ArenaError::MatchNotFound(_)
            | ArenaError::FormatNotFound(_) => ErrorKind::NotFound,
            ArenaError::TournamentFull { .. } => ErrorKind::Capacity,
            ArenaError::WrongStatus { .. }
            | ArenaError::AlreadyEntered { .. }
            | ArenaError::RoundIncomplete { .. }
            | ArenaError::MatchAlreadyCompleted(_)
            | ArenaError::NotAParticipant { .. }
            | ArenaError::NotEnoughParticipants { .. }
            | ArenaError::SelfMatch(_) => ErrorKind::InvalidState,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Failures reading or writing a snapshot file
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Failures loading or validating an [`crate::ArenaConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T, E = ArenaError> = std::result::Result<T, E>;
