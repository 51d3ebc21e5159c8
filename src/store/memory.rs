//! In-memory store: every collaborator trait behind a single `RwLock`.

use super::{
    EnrollmentStore, MatchStore, ParticipantRegistry, RoundCommit, StoreError, StoreResult,
    TournamentStore,
};
use crate::models::{
    Enrollment, EnrollmentId, Match, MatchId, Participant, ParticipantId, Tournament,
    TournamentId,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Tournament>,
    matches: HashMap<TournamentId, Vec<Match>>,
    enrollments: HashMap<TournamentId, Vec<Enrollment>>,
}

/// Process-local store. A single lock makes every write atomic with respect to readers.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    /// All tournaments, unordered.
    pub fn tournaments(&self) -> StoreResult<Vec<Tournament>> {
        Ok(self.read()?.tournaments.values().cloned().collect())
    }
}

impl ParticipantRegistry for MemoryStore {
    fn accepted_participants(&self, tournament: TournamentId) -> StoreResult<Vec<Participant>> {
        let g = self.read()?;
        Ok(g.enrollments
            .get(&tournament)
            .map(|list| {
                list.iter()
                    .filter(|e| e.is_accepted())
                    .map(|e| e.participant.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl TournamentStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<()> {
        let mut g = self.write()?;
        if g.tournaments.contains_key(&tournament.id) {
            return Err(StoreError::Conflict(format!(
                "tournament {} already exists",
                tournament.id
            )));
        }
        g.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn delete_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let mut g = self.write()?;
        let removed = g.tournaments.remove(&id);
        if removed.is_some() {
            g.matches.remove(&id);
            g.enrollments.remove(&id);
        }
        Ok(removed)
    }
}

impl MatchStore for MemoryStore {
    fn existing_matches(&self, tournament: TournamentId) -> StoreResult<Vec<Match>> {
        let g = self.read()?;
        let mut matches = g.matches.get(&tournament).cloned().unwrap_or_default();
        matches.sort_by_key(|m| (m.round, m.position));
        Ok(matches)
    }

    fn finished_matches(&self, tournament: TournamentId, round: u32) -> StoreResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .existing_matches(tournament)?
            .into_iter()
            .filter(|m| m.round == round && m.is_finished())
            .collect();
        matches.sort_by_key(|m| m.position);
        Ok(matches)
    }

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>> {
        let g = self.read()?;
        Ok(g.matches.values().flatten().find(|m| m.id == id).cloned())
    }

    fn participant_matches(&self, participant: ParticipantId) -> StoreResult<Vec<Match>> {
        let g = self.read()?;
        Ok(g.matches
            .values()
            .flatten()
            .filter(|m| m.involves(participant))
            .cloned()
            .collect())
    }

    fn commit_round(&self, tournament: TournamentId, commit: RoundCommit) -> StoreResult<()> {
        let mut g = self.write()?;
        let inner = &mut *g;
        let t = inner
            .tournaments
            .get_mut(&tournament)
            .ok_or_else(|| StoreError::Missing(format!("tournament {tournament}")))?;
        if t.state != commit.expected {
            return Err(StoreError::Conflict(format!(
                "tournament {tournament} is {}, expected {}",
                t.state, commit.expected
            )));
        }
        let stored = inner.matches.entry(tournament).or_default();
        if let Some(clash) = commit
            .matches
            .iter()
            .find(|new| stored.iter().any(|m| m.round == new.round && m.position == new.position))
        {
            return Err(StoreError::Conflict(format!(
                "round {} position {} already exists",
                clash.round, clash.position
            )));
        }
        stored.extend(commit.matches);
        t.state = commit.next;
        Ok(())
    }

    fn update_match(&self, m: &Match) -> StoreResult<()> {
        let mut g = self.write()?;
        let slot = g
            .matches
            .get_mut(&m.tournament)
            .and_then(|list| list.iter_mut().find(|x| x.id == m.id))
            .ok_or_else(|| StoreError::Missing(format!("match {}", m.id)))?;
        *slot = m.clone();
        Ok(())
    }
}

impl EnrollmentStore for MemoryStore {
    fn enrollments(&self, tournament: TournamentId) -> StoreResult<Vec<Enrollment>> {
        Ok(self
            .read()?
            .enrollments
            .get(&tournament)
            .cloned()
            .unwrap_or_default())
    }

    fn participant_enrollments(&self, participant: ParticipantId) -> StoreResult<Vec<Enrollment>> {
        let g = self.read()?;
        Ok(g.enrollments
            .values()
            .flatten()
            .filter(|e| e.participant.id == participant)
            .cloned()
            .collect())
    }

    fn find_enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>> {
        let g = self.read()?;
        Ok(g.enrollments.values().flatten().find(|e| e.id == id).cloned())
    }

    fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<()> {
        let mut g = self.write()?;
        if !g.tournaments.contains_key(&enrollment.tournament) {
            return Err(StoreError::Missing(format!(
                "tournament {}",
                enrollment.tournament
            )));
        }
        let list = g.enrollments.entry(enrollment.tournament).or_default();
        if list
            .iter()
            .any(|e| e.participant.id == enrollment.participant.id)
        {
            return Err(StoreError::Conflict(format!(
                "participant {} already enrolled",
                enrollment.participant.id
            )));
        }
        list.push(enrollment);
        Ok(())
    }

    fn update_enrollment(&self, enrollment: &Enrollment) -> StoreResult<()> {
        let mut g = self.write()?;
        let slot = g
            .enrollments
            .get_mut(&enrollment.tournament)
            .and_then(|list| list.iter_mut().find(|e| e.id == enrollment.id))
            .ok_or_else(|| StoreError::Missing(format!("enrollment {}", enrollment.id)))?;
        *slot = enrollment.clone();
        Ok(())
    }

    fn delete_enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>> {
        let mut g = self.write()?;
        for list in g.enrollments.values_mut() {
            if let Some(i) = list.iter().position(|e| e.id == id) {
                return Ok(Some(list.remove(i)));
            }
        }
        Ok(None)
    }
}
