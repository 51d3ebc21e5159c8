//! Integration tests for bracket building: sizing, byes, preconditions, and persistence.

mod common;

use common::{coach, engine, open_tournament, start_date};
use std::collections::HashSet;
use tennis_bracket::logic::bracket_size;
use tennis_bracket::models::DEFAULT_CAPACITY;
use tennis_bracket::store::{MatchStore, TournamentStore};
use tennis_bracket::{
    Caller, EnrollmentState, MatchState, Participant, Role, Tournament, TournamentError,
    TournamentKind, TournamentState,
};
use uuid::Uuid;

#[test]
fn build_produces_half_bracket_matches_for_every_size() {
    for n in (2..=33).chain([48, 64]) {
        let engine = engine();
        let (t, organizer, players) = open_tournament(&engine, n);
        let matches = engine.build_bracket(t.id, &organizer).unwrap();

        let size = bracket_size(n);
        assert_eq!(matches.len(), size / 2, "n = {n}");
        assert_eq!(matches.iter().filter(|m| m.is_bye()).count(), size - n, "n = {n}");

        let mut seen = HashSet::new();
        for p in matches.iter().flat_map(|m| m.participants()) {
            assert!(seen.insert(p.id), "participant {} placed twice", p.name);
        }
        let expected: HashSet<_> = players.iter().map(|p| p.id).collect();
        assert_eq!(seen, expected);

        let positions: Vec<u32> = matches.iter().map(|m| m.position).collect();
        assert_eq!(positions, (1..=(size / 2) as u32).collect::<Vec<_>>());
        assert!(matches.iter().all(|m| m.round == 1 && m.date == start_date()));
        assert_eq!(engine.tournament(t.id).unwrap().state, TournamentState::InProgress);
    }
}

#[test]
fn five_participants_get_three_byes() {
    let engine = engine();
    let (t, organizer, _) = open_tournament(&engine, 5);
    let matches = engine.build_bracket(t.id, &organizer).unwrap();
    assert_eq!(matches.len(), 4);

    let byes: Vec<_> = matches.iter().filter(|m| m.is_bye()).collect();
    assert_eq!(byes.len(), 3);
    for b in &byes {
        assert_eq!(b.state, MatchState::Finished);
        assert_eq!(b.winner, b.player_1.as_ref().map(|p| p.id));
        assert_eq!(b.loser, None);
        assert_eq!(b.score.as_deref(), Some("Bye"));
    }
    let real: Vec<_> = matches.iter().filter(|m| !m.is_bye()).collect();
    assert_eq!(real.len(), 1);
    assert_eq!(real[0].state, MatchState::Scheduled);
    assert!(real[0].winner.is_none());
}

#[test]
fn second_build_fails_and_leaves_matches_untouched() {
    let engine = engine();
    let (t, organizer, _) = open_tournament(&engine, 6);
    engine.build_bracket(t.id, &organizer).unwrap();
    let before = engine.matches(t.id).unwrap();

    assert!(matches!(
        engine.build_bracket(t.id, &organizer),
        Err(TournamentError::AlreadyBuilt)
    ));
    assert_eq!(engine.matches(t.id).unwrap(), before);
}

#[test]
fn build_unknown_tournament_is_not_found() {
    let engine = engine();
    assert!(matches!(
        engine.build_bracket(Uuid::new_v4(), &coach()),
        Err(TournamentError::NotFound { .. })
    ));
}

#[test]
fn build_by_someone_else_is_forbidden() {
    let engine = engine();
    let (t, _, _) = open_tournament(&engine, 4);
    assert!(matches!(
        engine.build_bracket(t.id, &coach()),
        Err(TournamentError::Forbidden)
    ));
    assert!(engine.matches(t.id).unwrap().is_empty());
}

#[test]
fn administrator_may_build_any_bracket() {
    let engine = engine();
    let (t, _, _) = open_tournament(&engine, 4);
    let admin = Caller::new(Uuid::new_v4(), Role::Administrator);
    assert_eq!(engine.build_bracket(t.id, &admin).unwrap().len(), 2);
}

#[test]
fn build_needs_two_accepted_participants() {
    let engine = engine();
    let (t, organizer, _) = open_tournament(&engine, 1);
    assert!(matches!(
        engine.build_bracket(t.id, &organizer),
        Err(TournamentError::InsufficientParticipants {
            needed: 2,
            current: 1
        })
    ));
    assert_eq!(engine.tournament(t.id).unwrap().state, TournamentState::Planned);
}

#[test]
fn default_capacity_caps_self_enrollment() {
    let engine = engine();
    let organizer = coach();
    let t = Tournament::new("Crowded Cup", start_date(), organizer.id);
    let t = engine.create_tournament(t, &organizer).unwrap();
    for i in 0..DEFAULT_CAPACITY {
        let p = Participant::new(format!("P{i}"));
        engine.enroll(t.id, p.clone(), &Caller::new(p.id, Role::Athlete)).unwrap();
    }
    let late = Participant::new("Late");
    assert!(matches!(
        engine.enroll(t.id, late.clone(), &Caller::new(late.id, Role::Athlete)),
        Err(TournamentError::TournamentFull)
    ));
}

#[test]
fn pending_enrollments_do_not_count() {
    let engine = engine();
    let organizer = coach();
    let t = Tournament::new("Club Closed", start_date(), organizer.id)
        .with_kind(TournamentKind::Closed);
    let t = engine.create_tournament(t, &organizer).unwrap();
    let mut enrollments = Vec::new();
    for name in ["Ana", "Bo", "Cy"] {
        enrollments.push(engine.enroll(t.id, Participant::new(name), &organizer).unwrap());
    }
    assert!(matches!(
        engine.build_bracket(t.id, &organizer),
        Err(TournamentError::InsufficientParticipants { current: 0, .. })
    ));

    engine
        .set_enrollment_state(enrollments[0].id, EnrollmentState::Accepted, &organizer)
        .unwrap();
    engine
        .set_enrollment_state(enrollments[1].id, EnrollmentState::Accepted, &organizer)
        .unwrap();
    engine
        .set_enrollment_state(enrollments[2].id, EnrollmentState::Rejected, &organizer)
        .unwrap();

    let matches = engine.build_bracket(t.id, &organizer).unwrap();
    assert_eq!(matches.len(), 1);
    assert!(!matches[0].is_bye());
}

#[test]
fn finished_tournament_without_matches_is_invalid_state() {
    let engine = engine();
    let (t, organizer, _) = open_tournament(&engine, 4);
    let mut stored = engine.store().tournament(t.id).unwrap().unwrap();
    stored.state = TournamentState::Finished;
    engine.store().delete_tournament(t.id).unwrap();
    engine.store().insert_tournament(stored).unwrap();

    assert!(matches!(
        engine.build_bracket(t.id, &organizer),
        Err(TournamentError::InvalidState {
            expected: TournamentState::Planned,
            actual: TournamentState::Finished,
        })
    ));
}

#[test]
fn built_matches_round_trip_through_the_store() {
    let engine = engine();
    let (t, organizer, _) = open_tournament(&engine, 7);
    let built = engine.build_bracket(t.id, &organizer).unwrap();
    for m in &built {
        let loaded = engine.store().find_match(m.id).unwrap().unwrap();
        assert_eq!(loaded.round, m.round);
        assert_eq!(loaded.position, m.position);
        assert_eq!(loaded.player_1, m.player_1);
        assert_eq!(loaded.player_2, m.player_2);
    }
    assert_eq!(engine.store().existing_matches(t.id).unwrap(), built);
}

#[test]
fn deleting_a_tournament_drops_its_bracket() {
    let engine = engine();
    let (t, organizer, players) = open_tournament(&engine, 4);
    engine.build_bracket(t.id, &organizer).unwrap();

    let athlete = Caller::new(players[0].id, Role::Athlete);
    assert!(matches!(
        engine.delete_tournament(t.id, &athlete),
        Err(TournamentError::Forbidden)
    ));

    engine.delete_tournament(t.id, &organizer).unwrap();
    assert!(engine.matches(t.id).unwrap().is_empty());
    assert!(matches!(
        engine.tournament(t.id),
        Err(TournamentError::NotFound { .. })
    ));
    assert!(engine.history(players[0].id, None).unwrap().is_empty());
}
