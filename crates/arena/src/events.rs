//! Domain events emitted by the engine
//!
//! The engine is handed an [`EventSink`] at construction time. Each event
//! carries the data a subscriber needs without querying the engine again.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use crate::history::{MatchRecord, TournamentSummary};
use crate::profile::ArenaProfile;
use crate::rating::RatingDelta;
use crate::registry::TierChange;
use crate::reward::RewardIntent;
use crate::tournament::Tournament;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArenaEvent {
    PlayerRegistered {
        profile: ArenaProfile,
    },
    MatchFound {
        player: ArenaProfile,
        opponent: ArenaProfile,
    },
    MatchCompleted {
        record: MatchRecord,
        delta: RatingDelta,
    },
    TierChanged {
        change: TierChange,
    },
    TournamentCreated {
        tournament: Tournament,
    },
    TournamentEntered {
        tournament_id: String,
        player_id: String,
    },
    TournamentStarted {
        tournament: Tournament,
    },
    RoundAdvanced {
        tournament: Tournament,
        round: u32,
    },
    TournamentCompleted {
        summary: TournamentSummary,
    },
    TournamentCancelled {
        summary: TournamentSummary,
        reason: String,
    },
    Reward {
        intent: RewardIntent,
    },
    Loaded {
        players: usize,
        tournaments: usize,
    },
}

impl ArenaEvent {
    /// Short event name, e.g. `tournament_started`
    pub fn name(&self) -> &'static str {
        match self {
            ArenaEvent::PlayerRegistered { .. } => "player_registered",
            ArenaEvent::MatchFound { .. } => "match_found",
            ArenaEvent::MatchCompleted { .. } => "match_completed",
            ArenaEvent::TierChanged { .. } => "tier_changed",
            ArenaEvent::TournamentCreated { .. } => "tournament_created",
            ArenaEvent::TournamentEntered { .. } => "tournament_entered",
            ArenaEvent::TournamentStarted { .. } => "tournament_started",
            ArenaEvent::RoundAdvanced { .. } => "round_advanced",
            ArenaEvent::TournamentCompleted { .. } => "tournament_completed",
            ArenaEvent::TournamentCancelled { .. } => "tournament_cancelled",
            ArenaEvent::Reward { .. } => "reward",
            ArenaEvent::Loaded { .. } => "loaded",
        }
    }
}

/// Subscriber for [`ArenaEvent`]s
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ArenaEvent);
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ArenaEvent) {}
}

/// Keeps every event in a shared vector
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ArenaEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<ArenaEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(ArenaEvent::name).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ArenaEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Sync channel sender; a hung-up receiver is logged and ignored
pub struct ChannelSink {
    sender: Mutex<Sender<ArenaEvent>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<ArenaEvent>) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ArenaEvent) {
        let name = event.name();
        let sent = self
            .sender
            .lock()
            .map(|sender| sender.send(event).is_ok())
            .unwrap_or(false);
        if !sent {
            tracing::warn!(event = name, "event receiver disconnected, dropping event");
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: ArenaEvent) {
        (**self).emit(event)
    }
}
