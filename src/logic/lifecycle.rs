//! Tournament lifecycle: authorization, state gates, creation and removal.

use crate::logic::builder::MIN_PARTICIPANTS;
use crate::models::{
    Caller, Match, Role, Tournament, TournamentError, TournamentId, TournamentState,
};
use crate::store::{RoundCommit, StoreError, TournamentStore};

impl TournamentState {
    /// Only `Planned -> InProgress` and `InProgress -> Finished` are legal.
    pub fn can_transition_to(self, next: TournamentState) -> bool {
        use TournamentState::*;
        matches!((self, next), (Planned, InProgress) | (InProgress, Finished))
    }
}

/// Administrators may manage any tournament; everyone else only the ones they organize.
pub fn authorize(caller: &Caller, tournament: &Tournament) -> Result<(), TournamentError> {
    if caller.is_admin() || caller.id == tournament.organizer {
        Ok(())
    } else {
        Err(TournamentError::Forbidden)
    }
}

pub fn require_state(
    tournament: &Tournament,
    expected: TournamentState,
) -> Result<(), TournamentError> {
    if tournament.state != expected {
        return Err(TournamentError::InvalidState {
            expected,
            actual: tournament.state,
        });
    }
    Ok(())
}

/// Fetch a tournament or fail with `NotFound`.
pub fn load_tournament<S: TournamentStore + ?Sized>(
    store: &S,
    id: TournamentId,
) -> Result<Tournament, TournamentError> {
    store
        .tournament(id)?
        .ok_or_else(|| TournamentError::tournament_not_found(id))
}

/// Prepare an atomic bracket write from the tournament's current state.
/// `next` may equal the current state (a round added mid-tournament) or be a legal transition.
pub fn round_commit(
    tournament: &Tournament,
    next: TournamentState,
    matches: Vec<Match>,
) -> Result<RoundCommit, TournamentError> {
    if next != tournament.state && !tournament.state.can_transition_to(next) {
        return Err(TournamentError::InvalidState {
            expected: next,
            actual: tournament.state,
        });
    }
    Ok(RoundCommit {
        expected: tournament.state,
        next,
        matches,
    })
}

/// Store a new planned tournament. Only coaches and administrators organize tournaments, and
/// the capacity must leave room for a bracket.
pub fn create_tournament<S: TournamentStore + ?Sized>(
    store: &S,
    tournament: Tournament,
    caller: &Caller,
) -> Result<Tournament, TournamentError> {
    if caller.role == Role::Athlete || (!caller.is_admin() && caller.id != tournament.organizer) {
        return Err(TournamentError::Forbidden);
    }
    require_state(&tournament, TournamentState::Planned)?;
    if tournament.capacity < MIN_PARTICIPANTS {
        return Err(TournamentError::InvalidCapacity {
            capacity: tournament.capacity,
            minimum: MIN_PARTICIPANTS,
        });
    }
    store.insert_tournament(tournament.clone())?;
    log::info!("Created tournament {} ({})", tournament.id, tournament.name);
    Ok(tournament)
}

/// Delete a tournament with its matches and enrollments (organizer or administrator).
pub fn delete_tournament<S: TournamentStore + ?Sized>(
    store: &S,
    id: TournamentId,
    caller: &Caller,
) -> Result<Tournament, TournamentError> {
    let tournament = load_tournament(store, id)?;
    authorize(caller, &tournament)?;
    let removed = store
        .delete_tournament(id)?
        .ok_or_else(|| TournamentError::tournament_not_found(id))?;
    log::info!("Deleted tournament {} with its matches and enrollments", id);
    Ok(removed)
}

/// A store conflict during a bracket write means another caller won the race.
pub(crate) fn conflict_as(err: StoreError, lost_race: TournamentError) -> TournamentError {
    match err {
        StoreError::Conflict(reason) => {
            log::warn!("Bracket write rejected: {}", reason);
            lost_race
        }
        other => TournamentError::Internal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn tournament(organizer: Uuid) -> Tournament {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        Tournament::new("Spring Open", start, organizer)
    }

    #[test]
    fn states_only_move_forward() {
        use TournamentState::*;
        assert!(Planned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Finished));
        assert!(!Planned.can_transition_to(Finished));
        assert!(!Finished.can_transition_to(Planned));
        assert!(!InProgress.can_transition_to(Planned));
        assert!(!Finished.can_transition_to(InProgress));
    }

    #[test]
    fn organizer_and_admin_are_authorized() {
        let organizer = Uuid::new_v4();
        let t = tournament(organizer);
        assert!(authorize(&Caller::new(organizer, Role::Coach), &t).is_ok());
        assert!(authorize(&Caller::new(Uuid::new_v4(), Role::Administrator), &t).is_ok());
        assert!(matches!(
            authorize(&Caller::new(Uuid::new_v4(), Role::Coach), &t),
            Err(TournamentError::Forbidden)
        ));
    }

    #[test]
    fn round_commit_rejects_backward_transition() {
        let mut t = tournament(Uuid::new_v4());
        t.state = TournamentState::Finished;
        assert!(matches!(
            round_commit(&t, TournamentState::InProgress, Vec::new()),
            Err(TournamentError::InvalidState { .. })
        ));
    }

    #[test]
    fn capacity_below_two_is_rejected() {
        let store = MemoryStore::new();
        let organizer = Caller::new(Uuid::new_v4(), Role::Coach);
        for capacity in [0, 1] {
            let t = tournament(organizer.id).with_capacity(capacity);
            assert!(matches!(
                create_tournament(&store, t, &organizer),
                Err(TournamentError::InvalidCapacity { minimum: 2, .. })
            ));
        }
        assert!(store.tournaments().unwrap().is_empty());

        let t = tournament(organizer.id).with_capacity(2);
        assert!(create_tournament(&store, t, &organizer).is_ok());
    }
}
