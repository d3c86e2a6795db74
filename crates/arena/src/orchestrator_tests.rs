use super::*;
use crate::config::ArenaConfig;
use crate::error::ErrorKind;
use crate::events::RecordingSink;
use crate::reward::RewardSink;
use chrono::Duration;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CollectRewards(Arc<Mutex<Vec<RewardIntent>>>);

impl RewardSink for CollectRewards {
    fn grant(&self, intent: &RewardIntent) {
        self.0.lock().unwrap().push(intent.clone());
    }
}

impl CollectRewards {
    fn placements(&self) -> Vec<(String, u32)> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|i| match &i.reason {
                RewardReason::Placement { place, .. } => Some((i.player_id.clone(), *place)),
                RewardReason::TierUp { .. } => None,
            })
            .collect()
    }
}

fn arena_with_players(count: usize) -> Arena {
    let mut arena = Arena::default().with_seed(99);
    for i in 0..count {
        arena.register(&format!("p{}", i));
    }
    arena
}

fn open_tournament(arena: &mut Arena, format: &str, players: usize) -> String {
    let tournament = arena.create_tournament(format).unwrap();
    for i in 0..players {
        arena
            .register_for_tournament(&tournament.id, &format!("p{}", i))
            .unwrap();
    }
    tournament.id
}

/// Report every pending match in favour of player1 and advance
fn play_round(arena: &mut Arena, tournament_id: &str) -> RoundOutcome {
    for m in arena.pending_matches(tournament_id).unwrap() {
        arena.report_match_result(&m.match_id, &m.player1).unwrap();
    }
    arena.advance_round(tournament_id).unwrap()
}

#[test]
fn test_create_unknown_format() {
    let mut arena = arena_with_players(0);
    let err = arena.create_tournament("hourly_blitz").unwrap_err();
    assert_eq!(err, ArenaError::FormatNotFound("hourly_blitz".to_string()));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_create_starts_in_registration() {
    let mut arena = arena_with_players(0);
    let tournament = arena.create_tournament("daily_1v1").unwrap();
    assert_eq!(tournament.status, TournamentStatus::Registration);
    assert!(tournament.id.starts_with("daily_1v1_"));
    assert_eq!(arena.next_expiry(), Some(tournament.expires_at));
}

#[test]
fn test_register_for_tournament_rules() {
    let mut arena = arena_with_players(3);
    let id = arena.create_tournament("daily_1v1").unwrap().id;

    arena.register_for_tournament(&id, "p0").unwrap();
    assert_eq!(arena.profile("p0").unwrap().tournaments.participated, 1);

    let dup = arena.register_for_tournament(&id, "p0").unwrap_err();
    assert!(matches!(dup, ArenaError::AlreadyEntered { .. }));
    assert_eq!(arena.profile("p0").unwrap().tournaments.participated, 1);

    let unknown = arena.register_for_tournament(&id, "ghost").unwrap_err();
    assert_eq!(unknown, ArenaError::PlayerNotFound("ghost".to_string()));

    let missing = arena.register_for_tournament("nope", "p1").unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    arena.register_for_tournament(&id, "p1").unwrap();
    arena.start_tournament(&id).unwrap();
    let late = arena.register_for_tournament(&id, "p2").unwrap_err();
    assert_eq!(late.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_register_respects_capacity() {
    let mut config = ArenaConfig::default();
    config.formats[0].max_participants = 2;
    let mut arena = Arena::new(config).with_seed(1);
    for id in ["a", "b", "c"] {
        arena.register(id);
    }
    let tid = arena.create_tournament("daily_1v1").unwrap().id;
    arena.register_for_tournament(&tid, "a").unwrap();
    arena.register_for_tournament(&tid, "b").unwrap();

    let err = arena.register_for_tournament(&tid, "c").unwrap_err();
    assert_eq!(
        err,
        ArenaError::TournamentFull {
            tournament: tid.clone(),
            max: 2
        }
    );
    assert_eq!(err.kind(), ErrorKind::Capacity);
}

#[test]
fn test_start_requires_two_participants() {
    let mut arena = arena_with_players(1);
    let id = open_tournament(&mut arena, "daily_1v1", 1);
    let err = arena.start_tournament(&id).unwrap_err();
    assert!(matches!(err, ArenaError::NotEnoughParticipants { count: 1, .. }));
    assert_eq!(
        arena.tournament(&id).unwrap().status,
        TournamentStatus::Registration
    );
}

#[test]
fn test_start_twice_is_invalid() {
    let mut arena = arena_with_players(2);
    let id = open_tournament(&mut arena, "daily_1v1", 2);
    arena.start_tournament(&id).unwrap();
    let err = arena.start_tournament(&id).unwrap_err();
    assert_eq!(
        err,
        ArenaError::WrongStatus {
            tournament: id.clone(),
            actual: TournamentStatus::Active,
            expected: TournamentStatus::Registration,
        }
    );
}

#[test]
fn test_eight_player_tournament_runs_three_rounds() {
    let rewards = CollectRewards::default();
    let events = RecordingSink::new();
    let mut arena = arena_with_players(8)
        .with_rewards(rewards.clone())
        .with_events(events.clone());
    let id = open_tournament(&mut arena, "daily_1v1", 8);

    let started = arena.start_tournament(&id).unwrap();
    assert_eq!(started.current_round, 1);
    assert_eq!(started.matches.len(), 4);
    assert_eq!(arena.pending_matches(&id).unwrap().len(), 4);

    assert_eq!(
        play_round(&mut arena, &id),
        RoundOutcome::Advanced { round: 2, matches: 2 }
    );
    assert_eq!(
        play_round(&mut arena, &id),
        RoundOutcome::Advanced { round: 3, matches: 1 }
    );
    let summary = match play_round(&mut arena, &id) {
        RoundOutcome::Completed(summary) => summary,
        other => panic!("expected completion, got {:?}", other),
    };

    assert_eq!(summary.status, TournamentStatus::Complete);
    assert_eq!(summary.match_count, 7);
    assert_eq!(summary.rounds, 3);
    let champion = summary.champion.clone().unwrap();

    // Retired from the active set, kept in history
    assert!(arena.tournament(&id).is_none());
    assert_eq!(arena.history().tournaments().len(), 1);
    assert_eq!(
        arena
            .history()
            .matches()
            .iter()
            .filter(|m| m.tournament_id.as_deref() == Some(id.as_str()))
            .count(),
        7
    );

    let profile = arena.profile(&champion).unwrap();
    assert_eq!(profile.tournaments.wins, 1);
    assert_eq!(profile.tournaments.top3, 1);
    assert_eq!(profile.titles, vec!["Daily Champion".to_string()]);
    assert_eq!(profile.wins, 3);

    // Daily duel pays 1st, 2nd and two shared 3rds
    let mut places: Vec<u32> = rewards.placements().iter().map(|(_, p)| *p).collect();
    places.sort();
    assert_eq!(places, vec![1, 2, 3, 3]);

    let names = events.names();
    assert!(names.contains(&"tournament_started"));
    assert_eq!(names.iter().filter(|n| **n == "round_advanced").count(), 2);
    assert_eq!(names.last(), Some(&"tournament_completed"));
}

#[test]
fn test_advance_with_pending_matches_fails() {
    let mut arena = arena_with_players(4);
    let id = open_tournament(&mut arena, "daily_1v1", 4);
    arena.start_tournament(&id).unwrap();

    let first = arena.pending_matches(&id).unwrap().remove(0);
    arena.report_match_result(&first.match_id, &first.player2).unwrap();

    let err = arena.advance_round(&id).unwrap_err();
    assert_eq!(
        err,
        ArenaError::RoundIncomplete {
            tournament: id.clone(),
            round: 1,
            pending: 1,
        }
    );
    assert_eq!(arena.tournament(&id).unwrap().current_round, 1);
}

#[test]
fn test_advance_before_start_is_invalid() {
    let mut arena = arena_with_players(2);
    let id = open_tournament(&mut arena, "daily_1v1", 2);
    assert_eq!(
        arena.advance_round(&id).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}

#[test]
fn test_report_result_validation() {
    let mut arena = arena_with_players(4);
    let id = open_tournament(&mut arena, "daily_1v1", 4);
    arena.start_tournament(&id).unwrap();
    let m = arena.pending_matches(&id).unwrap().remove(0);

    let outsider = ["p0", "p1", "p2", "p3"]
        .into_iter()
        .find(|p| !m.involves(p))
        .unwrap();
    assert!(matches!(
        arena.report_match_result(&m.match_id, outsider).unwrap_err(),
        ArenaError::NotAParticipant { .. }
    ));
    assert_eq!(
        arena.report_match_result("missing", "p0").unwrap_err(),
        ArenaError::MatchNotFound("missing".to_string())
    );

    let record = arena.report_match_result(&m.match_id, &m.player1).unwrap();
    assert_eq!(record.match_id, m.match_id);
    assert_eq!(record.tournament_id.as_deref(), Some(id.as_str()));
    assert_eq!(record.winner, m.player1);

    assert_eq!(
        arena.report_match_result(&m.match_id, &m.player2).unwrap_err(),
        ArenaError::MatchAlreadyCompleted(m.match_id.clone())
    );
    // The ladder moved
    assert_eq!(arena.profile(&m.player1).unwrap().rating(), 1016);
}

#[test]
fn test_odd_tournament_auto_advances_bye() {
    let mut arena = arena_with_players(5);
    let id = open_tournament(&mut arena, "daily_1v1", 5);
    let started = arena.start_tournament(&id).unwrap();
    assert_eq!(started.matches.len(), 2);
    let bye = started.bye_in_round(1).unwrap().player_id.clone();

    match play_round(&mut arena, &id) {
        RoundOutcome::Advanced { round: 2, .. } => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(arena.tournament(&id).unwrap().participants.contains(&bye));
    // The bye is neither a win nor a loss
    assert_eq!(arena.profile(&bye).unwrap().total_matches, 0);

    let summary = loop {
        if let RoundOutcome::Completed(summary) = play_round(&mut arena, &id) {
            break summary;
        }
    };
    assert_eq!(summary.match_count, 4);
    assert_eq!(summary.standings.len(), 5);
}

#[test]
fn test_grand_tournament_pays_top8() {
    let rewards = CollectRewards::default();
    let mut arena = arena_with_players(16).with_rewards(rewards.clone());
    let id = open_tournament(&mut arena, "monthly_grand", 16);
    arena.start_tournament(&id).unwrap();
    while let RoundOutcome::Advanced { .. } = play_round(&mut arena, &id) {}

    let mut places: Vec<u32> = rewards.placements().iter().map(|(_, p)| *p).collect();
    places.sort();
    assert_eq!(places, vec![1, 2, 3, 3, 5, 5, 5, 5]);
}

#[test]
fn test_simulated_tournament_completes() {
    let mut arena = arena_with_players(12);
    let id = open_tournament(&mut arena, "weekly_team", 12);
    arena.start_tournament(&id).unwrap();

    let summary = loop {
        for m in arena.pending_matches(&id).unwrap() {
            arena.simulate_tournament_match(&m.match_id).unwrap();
        }
        if let RoundOutcome::Completed(summary) = arena.advance_round(&id).unwrap() {
            break summary;
        }
    };
    assert_eq!(summary.match_count, 11);
    let champion = summary.champion.unwrap();
    assert_eq!(
        arena.profile(&champion).unwrap().titles,
        vec!["Team Champion".to_string()]
    );
}

#[test]
fn test_cancel_is_terminal_and_recorded() {
    let events = RecordingSink::new();
    let mut arena = arena_with_players(4).with_events(events.clone());
    let id = open_tournament(&mut arena, "daily_1v1", 4);
    arena.start_tournament(&id).unwrap();
    let m = arena.pending_matches(&id).unwrap().remove(0);
    arena.report_match_result(&m.match_id, &m.player1).unwrap();

    let summary = arena.cancel_tournament(&id, "admin").unwrap();
    assert_eq!(summary.status, TournamentStatus::Cancelled);
    assert_eq!(summary.match_count, 2);
    assert!(summary.champion.is_none());
    assert!(arena.tournament(&id).is_none());
    assert!(arena.next_expiry().is_none());
    assert_eq!(events.names().last(), Some(&"tournament_cancelled"));

    // Gone from the working set
    assert!(arena.advance_round(&id).unwrap_err().is_not_found());
    assert!(arena.cancel_tournament(&id, "again").is_err());
}

#[test]
fn test_expire_due_cancels_overdue_tournaments() {
    let mut arena = arena_with_players(2);
    let daily = open_tournament(&mut arena, "daily_1v1", 2);
    let monthly = arena.create_tournament("monthly_grand").unwrap().id;

    let now = Utc::now();
    assert!(arena.expire_due(now).is_empty());

    let expired = arena.expire_due(now + Duration::hours(25));
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].tournament_id, daily);
    assert_eq!(expired[0].status, TournamentStatus::Cancelled);
    assert!(arena.tournament(&daily).is_none());
    assert!(arena.tournament(&monthly).is_some());
}

#[test]
fn test_completion_cancels_expiry_task() {
    let mut arena = arena_with_players(2);
    let id = open_tournament(&mut arena, "daily_1v1", 2);
    arena.start_tournament(&id).unwrap();
    assert!(matches!(
        play_round(&mut arena, &id),
        RoundOutcome::Completed(_)
    ));
    assert!(arena.next_expiry().is_none());
    assert!(arena.expire_due(Utc::now() + Duration::days(365)).is_empty());
}
