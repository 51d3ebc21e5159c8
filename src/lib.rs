//! Tennis bracket engine: single-elimination tournaments, from accepted enrollments to a champion.

pub mod api;
pub mod config;
pub mod engine;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{EngineConfig, PairingPolicy, ServerConfig};
pub use engine::BracketEngine;
pub use logic::{Advance, BracketView};
pub use models::{
    Caller, Enrollment, EnrollmentId, EnrollmentState, Entity, Match, MatchId, MatchState,
    Participant, ParticipantId, Role, Tournament, TournamentError, TournamentId, TournamentKind,
    TournamentState, UserId,
};
pub use store::{BracketStore, MemoryStore, RoundCommit, StoreError};
