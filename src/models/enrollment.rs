//! Enrollment of a participant into a tournament.

use crate::models::participant::Participant;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an enrollment.
pub type EnrollmentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub tournament: TournamentId,
    pub participant: Participant,
    pub state: EnrollmentState,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(tournament: TournamentId, participant: Participant, state: EnrollmentState) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament,
            participant,
            state,
            enrolled_at: Utc::now(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.state == EnrollmentState::Accepted
    }
}
