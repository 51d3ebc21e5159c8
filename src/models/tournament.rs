//! Tournament, TournamentState, and the errors every operation can return.

use crate::models::participant::UserId;
use crate::store::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Default maximum number of accepted participants.
pub const DEFAULT_CAPACITY: usize = 32;

/// Kind of record a `NotFound` refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entity {
    Tournament,
    Match,
    Enrollment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Tournament => "Tournament",
            Entity::Match => "Match",
            Entity::Enrollment => "Enrollment",
        })
    }
}

/// Errors that can occur during tournament operations.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: Uuid },

    #[error("Caller is not allowed to manage this tournament")]
    Forbidden,

    #[error("Tournament not in a valid state for this action: expected {expected}, got {actual}")]
    InvalidState {
        expected: TournamentState,
        actual: TournamentState,
    },

    #[error("Insufficient participants: need {needed}, have {current}")]
    InsufficientParticipants { needed: usize, current: usize },

    #[error("Capacity {capacity} is below the {minimum} participants a bracket needs")]
    InvalidCapacity { capacity: usize, minimum: usize },

    #[error("Bracket already built for this tournament")]
    AlreadyBuilt,

    #[error("No finished matches to advance from")]
    NoCompletedRound,

    #[error("Round {round} is not complete")]
    IncompleteRound { round: u32 },

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Participant already enrolled in this tournament")]
    DuplicateEnrollment,

    #[error("Tournament has reached its maximum number of participants")]
    TournamentFull,

    #[error("Store error: {0}")]
    Internal(#[from] StoreError),
}

impl TournamentError {
    pub fn tournament_not_found(id: TournamentId) -> Self {
        TournamentError::NotFound {
            entity: Entity::Tournament,
            id,
        }
    }
}

/// Lifecycle of a tournament. Strictly forward: planned, in progress, finished.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Accepting enrollments; no bracket yet.
    #[default]
    Planned,
    /// Bracket built; rounds are being played.
    InProgress,
    /// A champion has been decided.
    Finished,
}

impl fmt::Display for TournamentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TournamentState::Planned => "planned",
            TournamentState::InProgress => "in_progress",
            TournamentState::Finished => "finished",
        })
    }
}

/// Who may enroll participants.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentKind {
    /// Athletes enroll themselves and are accepted right away.
    #[default]
    Open,
    /// Organizer enrolls athletes; enrollments start pending.
    Closed,
}

/// Tournament metadata. Matches and enrollments live in the store, keyed by `id`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub surface: String,
    pub start_date: NaiveDate,
    pub kind: TournamentKind,
    pub state: TournamentState,
    /// Maximum number of accepted participants.
    pub capacity: usize,
    /// The organizer (coach) who owns the tournament.
    pub organizer: UserId,
}

impl Tournament {
    /// Create a new planned tournament owned by `organizer`.
    pub fn new(name: impl Into<String>, start_date: NaiveDate, organizer: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            surface: String::new(),
            start_date,
            kind: TournamentKind::Open,
            state: TournamentState::Planned,
            capacity: DEFAULT_CAPACITY,
            organizer,
        }
    }

    pub fn with_kind(mut self, kind: TournamentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_surface(mut self, surface: impl Into<String>) -> Self {
        self.surface = surface.into();
        self
    }
}
