//! Shared fixtures: an in-memory engine and open tournaments with self-enrolled athletes.
#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tennis_bracket::models::DEFAULT_CAPACITY;
use tennis_bracket::{
    BracketEngine, Caller, EngineConfig, Match, MatchState, MemoryStore, Participant, Role,
    Tournament, TournamentId,
};
use uuid::Uuid;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

pub fn engine() -> BracketEngine<MemoryStore> {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> BracketEngine<MemoryStore> {
    BracketEngine::new(Arc::new(MemoryStore::new()), config)
}

pub fn coach() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Coach)
}

/// Create an open tournament organized by a fresh coach and self-enroll `n` athletes.
/// Capacity grows past the default when `n` needs it.
pub fn open_tournament(
    engine: &BracketEngine<MemoryStore>,
    n: usize,
) -> (Tournament, Caller, Vec<Participant>) {
    let organizer = coach();
    let t = Tournament::new("Summer Open", start_date(), organizer.id)
        .with_capacity(n.max(DEFAULT_CAPACITY));
    let t = engine.create_tournament(t, &organizer).unwrap();
    let players: Vec<Participant> = (0..n).map(|i| Participant::new(format!("P{i}"))).collect();
    for p in &players {
        let athlete = Caller::new(p.id, Role::Athlete);
        engine.enroll(t.id, p.clone(), &athlete).unwrap();
    }
    (t, organizer, players)
}

pub fn round_of(engine: &BracketEngine<MemoryStore>, t: TournamentId, round: u32) -> Vec<Match> {
    engine
        .matches(t)
        .unwrap()
        .into_iter()
        .filter(|m| m.round == round)
        .collect()
}

/// Decide every open match of `round` in favour of `player_1`.
pub fn play_round(
    engine: &BracketEngine<MemoryStore>,
    t: TournamentId,
    organizer: &Caller,
    round: u32,
) {
    for m in round_of(engine, t, round) {
        if m.state == MatchState::Finished {
            continue;
        }
        let winner = m.player_1.as_ref().unwrap().id;
        engine
            .record_result(m.id, winner, Some("6-4 6-4".to_string()), organizer)
            .unwrap();
    }
}
