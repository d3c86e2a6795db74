//! Tournament lifecycle on top of the arena engine
//!
//! Result intake and round advancement both take `&mut Arena`, so "every
//! match of round N is complete" is checked and acted on without any other
//! write interleaving.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::arena::Arena;
use crate::error::{ArenaError, Result};
use crate::events::ArenaEvent;
use crate::history::{MatchRecord, TournamentSummary};
use crate::registry::MatchOutcome;
use crate::reward::{RewardIntent, RewardReason};
use crate::tournament::{BracketMatch, Tournament, TournamentStatus};

/// What `advance_round` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// A new round was paired
    Advanced { round: u32, matches: usize },
    /// One player is left; the tournament is finished
    Completed(TournamentSummary),
}

impl Arena {
    /// Instantiate a tournament from a configured format
    pub fn create_tournament(&mut self, format_id: &str) -> Result<Tournament> {
        let format = self
            .config
            .format(format_id)
            .cloned()
            .ok_or_else(|| ArenaError::FormatNotFound(format_id.to_string()))?;

        let id = format!("{}_{}", format.id, Uuid::new_v4().simple());
        let tournament = Tournament::new(id.clone(), format, Utc::now());
        self.scheduler.schedule(&id, tournament.expires_at);
        self.tournaments.insert(id.clone(), tournament.clone());

        info!(tournament = %id, format = format_id, "tournament created");
        self.emit(ArenaEvent::TournamentCreated {
            tournament: tournament.clone(),
        });
        Ok(tournament)
    }

    /// Active (not yet finished) tournament by id
    pub fn tournament(&self, tournament_id: &str) -> Option<&Tournament> {
        self.tournaments.get(tournament_id)
    }

    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    /// Enter a registered player into a tournament still taking sign-ups
    pub fn register_for_tournament(&mut self, tournament_id: &str, player_id: &str) -> Result<()> {
        let tournament = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;
        let profile = self.registry.get_mut(player_id)?;

        if tournament.status != TournamentStatus::Registration {
            return Err(ArenaError::WrongStatus {
                tournament: tournament_id.to_string(),
                actual: tournament.status,
                expected: TournamentStatus::Registration,
            });
        }
        if tournament.has_entrant(player_id) {
            return Err(ArenaError::AlreadyEntered {
                tournament: tournament_id.to_string(),
                player: player_id.to_string(),
            });
        }
        if tournament.is_full() {
            return Err(ArenaError::TournamentFull {
                tournament: tournament_id.to_string(),
                max: tournament.format.max_participants,
            });
        }

        tournament.entrants.push(player_id.to_string());
        tournament.participants.push(player_id.to_string());
        profile.tournaments.participated += 1;

        self.emit(ArenaEvent::TournamentEntered {
            tournament_id: tournament_id.to_string(),
            player_id: player_id.to_string(),
        });
        Ok(())
    }

    /// Close registration and pair round 1
    pub fn start_tournament(&mut self, tournament_id: &str) -> Result<Tournament> {
        let tournament = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status != TournamentStatus::Registration {
            return Err(ArenaError::WrongStatus {
                tournament: tournament_id.to_string(),
                actual: tournament.status,
                expected: TournamentStatus::Registration,
            });
        }
        if tournament.participants.len() < 2 {
            return Err(ArenaError::NotEnoughParticipants {
                tournament: tournament_id.to_string(),
                count: tournament.participants.len(),
            });
        }

        tournament.status = TournamentStatus::Active;
        tournament.current_round = 1;
        tournament.started_at = Some(Utc::now());
        tournament.generate_round(&mut self.rng);
        let tournament = tournament.clone();

        info!(
            tournament = tournament_id,
            participants = tournament.participants.len(),
            "tournament started"
        );
        self.emit(ArenaEvent::TournamentStarted {
            tournament: tournament.clone(),
        });
        Ok(tournament)
    }

    /// Unfinished matches of a tournament's current round
    pub fn pending_matches(&self, tournament_id: &str) -> Result<Vec<BracketMatch>> {
        let tournament = self
            .tournaments
            .get(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;
        Ok(tournament.pending_matches().into_iter().cloned().collect())
    }

    /// Record the winner of a bracket match.
    ///
    /// Goes through the same rating path as standalone matches, so tournament
    /// play moves the global ladder.
    pub fn report_match_result(&mut self, match_id: &str, winner_id: &str) -> Result<MatchRecord> {
        let (tournament_id, bracket_match) = self.locate_match(match_id)?;

        let loser_id = bracket_match
            .opponent_of(winner_id)
            .ok_or_else(|| ArenaError::NotAParticipant {
                match_id: match_id.to_string(),
                player: winner_id.to_string(),
            })?
            .to_string();

        let outcome = MatchOutcome::new(winner_id, &loser_id);
        self.decide(&tournament_id, &bracket_match, outcome)
    }

    /// Roll a bracket match's winner from the players' ratings and report it
    pub fn simulate_tournament_match(&mut self, match_id: &str) -> Result<MatchRecord> {
        let (tournament_id, bracket_match) = self.locate_match(match_id)?;
        let outcome = self.roll_outcome(&bracket_match.player1, &bracket_match.player2)?;
        self.decide(&tournament_id, &bracket_match, outcome)
    }

    /// Find an open match in an active tournament
    fn locate_match(&self, match_id: &str) -> Result<(String, BracketMatch)> {
        let (tournament, bracket_match) = self
            .tournaments
            .values()
            .find_map(|t| t.find_match(match_id).map(|m| (t, m.clone())))
            .ok_or_else(|| ArenaError::MatchNotFound(match_id.to_string()))?;

        if tournament.status != TournamentStatus::Active {
            return Err(ArenaError::WrongStatus {
                tournament: tournament.id.clone(),
                actual: tournament.status,
                expected: TournamentStatus::Active,
            });
        }
        if bracket_match.completed {
            return Err(ArenaError::MatchAlreadyCompleted(match_id.to_string()));
        }
        Ok((tournament.id.clone(), bracket_match))
    }

    fn decide(
        &mut self,
        tournament_id: &str,
        bracket_match: &BracketMatch,
        outcome: MatchOutcome,
    ) -> Result<MatchRecord> {
        let record = self.resolve(
            &outcome,
            &bracket_match.player1,
            &bracket_match.player2,
            bracket_match.match_id.clone(),
            Some(tournament_id),
        )?;

        if let Some(m) = self
            .tournaments
            .get_mut(tournament_id)
            .and_then(|t| t.find_match_mut(&bracket_match.match_id))
        {
            m.winner = Some(outcome.winner);
            m.completed = true;
        }
        Ok(record)
    }

    /// Move to the next round once every match of the current one is decided
    pub fn advance_round(&mut self, tournament_id: &str) -> Result<RoundOutcome> {
        let tournament = self
            .tournaments
            .get_mut(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;

        if tournament.status != TournamentStatus::Active {
            return Err(ArenaError::WrongStatus {
                tournament: tournament_id.to_string(),
                actual: tournament.status,
                expected: TournamentStatus::Active,
            });
        }
        let pending = tournament.pending_matches().len();
        if pending > 0 {
            return Err(ArenaError::RoundIncomplete {
                tournament: tournament_id.to_string(),
                round: tournament.current_round,
                pending,
            });
        }

        let survivors = tournament.round_survivors(tournament.current_round);
        if let [champion] = survivors.as_slice() {
            let champion = champion.clone();
            return self
                .complete(tournament_id, champion)
                .map(RoundOutcome::Completed);
        }

        tournament.participants = survivors;
        tournament.current_round += 1;
        tournament.generate_round(&mut self.rng);

        let round = tournament.current_round;
        let matches = tournament.round_matches(round).count();
        let snapshot = tournament.clone();

        info!(tournament = tournament_id, round, matches, "round advanced");
        self.emit(ArenaEvent::RoundAdvanced {
            tournament: snapshot,
            round,
        });
        Ok(RoundOutcome::Advanced { round, matches })
    }

    /// Crown the champion, pay placements, and retire the tournament
    fn complete(&mut self, tournament_id: &str, champion: String) -> Result<TournamentSummary> {
        let mut tournament = self
            .tournaments
            .remove(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;
        self.scheduler.cancel(tournament_id);

        let now = Utc::now();
        tournament.status = TournamentStatus::Complete;
        tournament.winner = Some(champion.clone());
        tournament.participants = vec![champion.clone()];
        tournament.finished_at = Some(now);

        self.distribute_rewards(&tournament);

        let summary = summarize(&tournament, now);
        self.history.record_tournament(summary.clone());

        info!(
            tournament = tournament_id,
            champion = %champion,
            matches = summary.match_count,
            "tournament complete"
        );
        self.emit(ArenaEvent::TournamentCompleted {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    fn distribute_rewards(&mut self, tournament: &Tournament) {
        let rewards = &tournament.format.rewards;
        debug_assert!(
            rewards.first.is_some(),
            "format {} has no first-place reward",
            tournament.format.id
        );
        if rewards.first.is_none() {
            error!(format = %tournament.format.id, "tournament format has no first-place reward");
        }

        for standing in tournament.standings() {
            if let Ok(profile) = self.registry.get_mut(&standing.player_id) {
                if standing.place == 1 {
                    profile.tournaments.wins += 1;
                    if let Some(title) = rewards.first.as_ref().and_then(|r| r.title.clone()) {
                        profile.titles.push(title);
                    }
                }
                if standing.place <= 3 {
                    profile.tournaments.top3 += 1;
                }
            }

            if let Some(reward) = rewards.for_place(standing.place) {
                self.grant(RewardIntent {
                    player_id: standing.player_id.clone(),
                    reward: reward.clone(),
                    reason: RewardReason::Placement {
                        tournament_id: tournament.id.clone(),
                        place: standing.place,
                    },
                });
            }
        }
    }

    /// Move a registration or active tournament to the terminal `Cancelled`
    /// state. Matches already played keep their rating effects.
    pub fn cancel_tournament(
        &mut self,
        tournament_id: &str,
        reason: &str,
    ) -> Result<TournamentSummary> {
        let mut tournament = self
            .tournaments
            .remove(tournament_id)
            .ok_or_else(|| ArenaError::TournamentNotFound(tournament_id.to_string()))?;
        self.scheduler.cancel(tournament_id);

        let now = Utc::now();
        tournament.status = TournamentStatus::Cancelled;
        tournament.finished_at = Some(now);

        let summary = summarize(&tournament, now);
        self.history.record_tournament(summary.clone());

        info!(tournament = tournament_id, reason, "tournament cancelled");
        self.emit(ArenaEvent::TournamentCancelled {
            summary: summary.clone(),
            reason: reason.to_string(),
        });
        Ok(summary)
    }

    /// Cancel every tournament whose deadline has passed
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<TournamentSummary> {
        let mut expired = Vec::new();
        for tournament_id in self.scheduler.due(now) {
            warn!(tournament = %tournament_id, "tournament expired");
            match self.cancel_tournament(&tournament_id, "expired") {
                Ok(summary) => expired.push(summary),
                // Stale task for a tournament that already left the active set
                Err(_) => {
                    self.scheduler.cancel(&tournament_id);
                }
            }
        }
        expired
    }

    /// Earliest pending tournament deadline
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_deadline()
    }
}

pub(crate) fn summarize(tournament: &Tournament, finished_at: DateTime<Utc>) -> TournamentSummary {
    let standings = if tournament.status == TournamentStatus::Complete {
        tournament.standings()
    } else {
        Vec::new()
    };
    TournamentSummary {
        tournament_id: tournament.id.clone(),
        format_id: tournament.format.id.clone(),
        status: tournament.status,
        champion: tournament.winner.clone(),
        standings,
        participants: tournament.entrants.len(),
        match_count: tournament.match_count(),
        rounds: tournament.current_round,
        finished_at,
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
