//! Collaborator interfaces the bracket engine reads from and writes through.
//!
//! The engine never owns storage. Each trait is a seam an external store implements;
//! [`MemoryStore`] is the in-process implementation used by the web app and tests.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Enrollment, EnrollmentId, Match, MatchId, Participant, ParticipantId, Tournament,
    TournamentId, TournamentState,
};

/// Failures raised by a store. Never retried by the engine.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A check-and-set write found the stored state different from what the caller read.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// A write referenced a record the store does not hold.
    #[error("record missing: {0}")]
    Missing(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One atomic bracket write: insert a round's matches and move the tournament state.
///
/// The store must reject the commit with [`StoreError::Conflict`] when the tournament is no longer
/// in `expected`, or when any `(round, position)` in `matches` already exists.
#[derive(Clone, Debug)]
pub struct RoundCommit {
    pub expected: TournamentState,
    pub next: TournamentState,
    pub matches: Vec<Match>,
}

/// Supplies the accepted enrollees of a tournament, in enrollment order.
pub trait ParticipantRegistry {
    fn accepted_participants(&self, tournament: TournamentId) -> StoreResult<Vec<Participant>>;
}

pub trait TournamentStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<()>;

    /// Remove the tournament together with its matches and enrollments in one transaction.
    /// Returns the removed tournament, `None` if it did not exist.
    fn delete_tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;
}

pub trait MatchStore {
    /// Every match of the tournament, ordered by round then position.
    fn existing_matches(&self, tournament: TournamentId) -> StoreResult<Vec<Match>>;

    /// Finished matches of one round, ordered by position.
    fn finished_matches(&self, tournament: TournamentId, round: u32) -> StoreResult<Vec<Match>>;

    fn find_match(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Every match involving `participant`, across tournaments, in no particular order.
    fn participant_matches(&self, participant: ParticipantId) -> StoreResult<Vec<Match>>;

    /// Atomically insert matches and transition the tournament (see [`RoundCommit`]).
    fn commit_round(&self, tournament: TournamentId, commit: RoundCommit) -> StoreResult<()>;

    /// Replace a stored match (result recording). Fails with `Missing` if it does not exist.
    fn update_match(&self, m: &Match) -> StoreResult<()>;
}

pub trait EnrollmentStore {
    /// Enrollments of the tournament in the order they were made.
    fn enrollments(&self, tournament: TournamentId) -> StoreResult<Vec<Enrollment>>;

    /// Every enrollment of `participant`, across tournaments, in no particular order.
    fn participant_enrollments(&self, participant: ParticipantId) -> StoreResult<Vec<Enrollment>>;

    fn find_enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>>;

    fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<()>;

    fn update_enrollment(&self, enrollment: &Enrollment) -> StoreResult<()>;

    /// Remove an enrollment. Returns it, `None` if it did not exist.
    fn delete_enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>>;
}

/// Everything the engine needs from a backing store.
pub trait BracketStore: ParticipantRegistry + TournamentStore + MatchStore + EnrollmentStore {}

impl<T> BracketStore for T where
    T: ParticipantRegistry + TournamentStore + MatchStore + EnrollmentStore
{
}
