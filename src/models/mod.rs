//! Data structures for the tennis bracket: tournaments, participants, matches, enrollments.

mod enrollment;
mod game;
mod participant;
mod tournament;

pub use enrollment::{Enrollment, EnrollmentId, EnrollmentState};
pub use game::{Match, MatchId, MatchState, BYE_SCORE};
pub use participant::{Caller, Participant, ParticipantId, Role, UnknownRole, UserId};
pub use tournament::{
    Entity, Tournament, TournamentError, TournamentId, TournamentKind, TournamentState,
    DEFAULT_CAPACITY,
};
