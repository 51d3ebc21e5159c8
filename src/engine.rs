//! `BracketEngine`: the logic functions behind an injected store, with every write to a
//! tournament serialized by a per-tournament lock.

use crate::config::EngineConfig;
use crate::logic::{self, Advance, BracketView};
use crate::models::{
    Caller, Enrollment, EnrollmentId, EnrollmentState, Match, MatchId, Participant,
    ParticipantId, Tournament, TournamentError, TournamentId,
};
use crate::store::{BracketStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct BracketEngine<S> {
    store: Arc<S>,
    config: EngineConfig,
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: BracketStore> BracketEngine<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `f` while holding the lock of `tournament`. Two calls on the same tournament never
    /// overlap; calls on different tournaments do not wait on each other.
    ///
    /// Unknown tournaments fail with `NotFound` before any lock entry is made, and an entry is
    /// dropped again once no other caller holds or waits on it.
    fn exclusive<T>(
        &self,
        tournament: TournamentId,
        f: impl FnOnce() -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        logic::lifecycle::load_tournament(self.store.as_ref(), tournament)?;
        let lock = {
            let mut table = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
            Arc::clone(table.entry(tournament).or_default())
        };
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(StoreError::Poisoned.into()),
        };
        self.release(tournament, &lock);
        result
    }

    /// Forget the lock of `tournament` when the table and `lock` are its only holders.
    fn release(&self, tournament: TournamentId, lock: &Arc<Mutex<()>>) {
        let Ok(mut table) = self.locks.lock() else {
            return;
        };
        let idle = table
            .get(&tournament)
            .is_some_and(|held| Arc::ptr_eq(held, lock) && Arc::strong_count(lock) == 2);
        if idle {
            table.remove(&tournament);
        }
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        logic::lifecycle::load_tournament(self.store.as_ref(), id)
    }

    pub fn create_tournament(
        &self,
        tournament: Tournament,
        caller: &Caller,
    ) -> Result<Tournament, TournamentError> {
        logic::create_tournament(self.store.as_ref(), tournament, caller)
    }

    pub fn delete_tournament(
        &self,
        tournament: TournamentId,
        caller: &Caller,
    ) -> Result<Tournament, TournamentError> {
        self.exclusive(tournament, || {
            logic::delete_tournament(self.store.as_ref(), tournament, caller)
        })
    }

    pub fn enroll(
        &self,
        tournament: TournamentId,
        participant: Participant,
        caller: &Caller,
    ) -> Result<Enrollment, TournamentError> {
        self.exclusive(tournament, || {
            logic::enroll(self.store.as_ref(), tournament, participant, caller)
        })
    }

    pub fn set_enrollment_state(
        &self,
        enrollment: EnrollmentId,
        state: EnrollmentState,
        caller: &Caller,
    ) -> Result<Enrollment, TournamentError> {
        match self.store.find_enrollment(enrollment)?.map(|e| e.tournament) {
            Some(tournament) => self.exclusive(tournament, || {
                logic::set_enrollment_state(self.store.as_ref(), enrollment, state, caller)
            }),
            None => logic::set_enrollment_state(self.store.as_ref(), enrollment, state, caller),
        }
    }

    /// Remove an enrollment while the tournament is still planned.
    pub fn withdraw(
        &self,
        enrollment: EnrollmentId,
        caller: &Caller,
    ) -> Result<Enrollment, TournamentError> {
        match self.store.find_enrollment(enrollment)?.map(|e| e.tournament) {
            Some(tournament) => self.exclusive(tournament, || {
                logic::withdraw(self.store.as_ref(), enrollment, caller)
            }),
            None => logic::withdraw(self.store.as_ref(), enrollment, caller),
        }
    }

    pub fn enrollments(
        &self,
        tournament: TournamentId,
    ) -> Result<Vec<Enrollment>, TournamentError> {
        logic::tournament_enrollments(self.store.as_ref(), tournament)
    }

    pub fn participant_enrollments(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<Enrollment>, TournamentError> {
        logic::participant_enrollments(self.store.as_ref(), participant)
    }

    /// Build round 1 of a planned tournament from its accepted participants.
    pub fn build_bracket(
        &self,
        tournament: TournamentId,
        caller: &Caller,
    ) -> Result<Vec<Match>, TournamentError> {
        self.exclusive(tournament, || {
            logic::build_bracket(
                self.store.as_ref(),
                tournament,
                caller,
                &mut rand::thread_rng(),
            )
        })
    }

    /// Create the next round, or finish the tournament when one winner remains.
    pub fn advance_round(
        &self,
        tournament: TournamentId,
        caller: &Caller,
    ) -> Result<Advance, TournamentError> {
        self.exclusive(tournament, || {
            logic::advance_round(
                self.store.as_ref(),
                tournament,
                caller,
                &self.config,
                &mut rand::thread_rng(),
            )
        })
    }

    pub fn start_match(&self, id: MatchId, caller: &Caller) -> Result<Match, TournamentError> {
        let tournament = logic::results::load_match(self.store.as_ref(), id)?.tournament;
        self.exclusive(tournament, || logic::start_match(self.store.as_ref(), id, caller))
    }

    pub fn record_result(
        &self,
        id: MatchId,
        winner: ParticipantId,
        score: Option<String>,
        caller: &Caller,
    ) -> Result<Match, TournamentError> {
        let tournament = logic::results::load_match(self.store.as_ref(), id)?.tournament;
        self.exclusive(tournament, || {
            logic::record_result(self.store.as_ref(), id, winner, score, caller)
        })
    }

    pub fn bracket(&self, tournament: TournamentId) -> Result<BracketView, TournamentError> {
        logic::bracket(self.store.as_ref(), tournament)
    }

    pub fn champion(
        &self,
        tournament: TournamentId,
    ) -> Result<Option<Participant>, TournamentError> {
        logic::champion(self.store.as_ref(), tournament)
    }

    pub fn next_match(
        &self,
        participant: ParticipantId,
        tournament: Option<TournamentId>,
    ) -> Result<Option<Match>, TournamentError> {
        logic::next_match(self.store.as_ref(), participant, tournament)
    }

    pub fn history(
        &self,
        participant: ParticipantId,
        tournament: Option<TournamentId>,
    ) -> Result<Vec<Match>, TournamentError> {
        logic::history(self.store.as_ref(), participant, tournament)
    }

    /// Matches of one tournament as stored, ordered by round then position.
    pub fn matches(&self, tournament: TournamentId) -> Result<Vec<Match>, TournamentError> {
        Ok(self.store.existing_matches(tournament)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn lock_entries(engine: &BracketEngine<MemoryStore>) -> usize {
        engine.locks.lock().unwrap().len()
    }

    #[test]
    fn unknown_tournaments_leave_no_lock_entry() {
        let engine = BracketEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
        let admin = Caller::new(Uuid::new_v4(), Role::Administrator);
        for _ in 0..1000 {
            assert!(matches!(
                engine.build_bracket(Uuid::new_v4(), &admin),
                Err(TournamentError::NotFound { .. })
            ));
        }
        assert_eq!(lock_entries(&engine), 0);
    }

    #[test]
    fn lock_entries_are_dropped_after_use() {
        let engine = BracketEngine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
        let organizer = Caller::new(Uuid::new_v4(), Role::Coach);
        let start = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        let t = engine
            .create_tournament(Tournament::new("Easter", start, organizer.id), &organizer)
            .unwrap();
        for name in ["Mo", "Ned"] {
            let p = Participant::new(name);
            engine.enroll(t.id, p.clone(), &Caller::new(p.id, Role::Athlete)).unwrap();
        }
        engine.build_bracket(t.id, &organizer).unwrap();
        assert!(engine.build_bracket(t.id, &organizer).is_err());
        assert_eq!(lock_entries(&engine), 0);
    }
}
