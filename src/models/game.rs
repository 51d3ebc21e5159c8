//! Match and MatchState for single-elimination rounds.

use crate::models::participant::{Participant, ParticipantId};
use crate::models::tournament::TournamentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Score label stored on matches decided by a bye.
pub const BYE_SCORE: &str = "Bye";

/// Progress of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    #[default]
    Scheduled,
    InProgress,
    Finished,
}

/// One match of the bracket. Either slot may be empty (a bye), never both.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament: TournamentId,
    pub player_1: Option<Participant>,
    pub player_2: Option<Participant>,
    /// 1-based round number.
    pub round: u32,
    /// 1-based position inside the round. Positions `2k-1` and `2k` feed position `k` next round.
    pub position: u32,
    /// Nominal date the match is played.
    pub date: NaiveDate,
    pub winner: Option<ParticipantId>,
    pub loser: Option<ParticipantId>,
    pub score: Option<String>,
    pub state: MatchState,
}

impl Match {
    /// A scheduled match between two participants, no result yet.
    pub fn scheduled(
        tournament: TournamentId,
        round: u32,
        position: u32,
        date: NaiveDate,
        player_1: Participant,
        player_2: Participant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament,
            player_1: Some(player_1),
            player_2: Some(player_2),
            round,
            position,
            date,
            winner: None,
            loser: None,
            score: None,
            state: MatchState::Scheduled,
        }
    }

    /// A bye: created already finished, with the lone participant as winner and no loser.
    pub fn bye(
        tournament: TournamentId,
        round: u32,
        position: u32,
        date: NaiveDate,
        player: Participant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament,
            winner: Some(player.id),
            player_1: Some(player),
            player_2: None,
            round,
            position,
            date,
            loser: None,
            score: Some(BYE_SCORE.to_string()),
            state: MatchState::Finished,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player_1.is_none() || self.player_2.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.state == MatchState::Finished
    }

    /// Both participants present in this match (one for a bye).
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.player_1.iter().chain(self.player_2.iter())
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.participants().any(|p| p.id == participant)
    }

    /// The winning participant, once decided.
    pub fn winning_participant(&self) -> Option<&Participant> {
        let winner = self.winner?;
        self.participants().find(|p| p.id == winner)
    }

    /// The other participant of a two-participant match.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<&Participant> {
        if !self.involves(participant) {
            return None;
        }
        self.participants().find(|p| p.id != participant)
    }
}
