//! Read-only views of a bracket: rounds, a participant's next match, and match history.

use crate::logic::lifecycle::load_tournament;
use crate::models::{
    Match, MatchState, Participant, ParticipantId, Tournament, TournamentError, TournamentId,
    TournamentState,
};
use crate::store::{MatchStore, TournamentStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tournament with its matches grouped by round, each round ordered by position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BracketView {
    pub tournament: Tournament,
    pub rounds: BTreeMap<u32, Vec<Match>>,
    /// Set once the tournament is finished.
    pub champion: Option<Participant>,
}

/// Group matches by round. Input order within a round is kept, so pass position-ordered matches.
pub fn group_rounds(matches: Vec<Match>) -> BTreeMap<u32, Vec<Match>> {
    let mut rounds: BTreeMap<u32, Vec<Match>> = BTreeMap::new();
    for m in matches {
        rounds.entry(m.round).or_default().push(m);
    }
    rounds
}

/// The winner of the last round, once the tournament is finished.
pub fn champion_of(
    tournament: &Tournament,
    rounds: &BTreeMap<u32, Vec<Match>>,
) -> Option<Participant> {
    if tournament.state != TournamentState::Finished {
        return None;
    }
    let (_, last) = rounds.iter().next_back()?;
    match last.as_slice() {
        [final_match] => final_match.winning_participant().cloned(),
        _ => None,
    }
}

pub fn bracket<S>(store: &S, tournament_id: TournamentId) -> Result<BracketView, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
{
    let tournament = load_tournament(store, tournament_id)?;
    let rounds = group_rounds(store.existing_matches(tournament_id)?);
    let champion = champion_of(&tournament, &rounds);
    Ok(BracketView {
        tournament,
        rounds,
        champion,
    })
}

/// Champion of a finished tournament, `None` while it is still running.
pub fn champion<S>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Option<Participant>, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
{
    Ok(bracket(store, tournament_id)?.champion)
}

fn matches_of<S>(
    store: &S,
    participant: ParticipantId,
    tournament: Option<TournamentId>,
) -> Result<Vec<Match>, TournamentError>
where
    S: MatchStore + ?Sized,
{
    let matches = match tournament {
        Some(id) => store
            .existing_matches(id)?
            .into_iter()
            .filter(|m| m.involves(participant))
            .collect(),
        None => store.participant_matches(participant)?,
    };
    Ok(matches)
}

/// Earliest scheduled match of `participant`, optionally within one tournament.
pub fn next_match<S>(
    store: &S,
    participant: ParticipantId,
    tournament: Option<TournamentId>,
) -> Result<Option<Match>, TournamentError>
where
    S: MatchStore + ?Sized,
{
    Ok(matches_of(store, participant, tournament)?
        .into_iter()
        .filter(|m| m.state == MatchState::Scheduled)
        .min_by_key(|m| (m.date, m.round, m.position)))
}

/// Every match of `participant`, newest first.
pub fn history<S>(
    store: &S,
    participant: ParticipantId,
    tournament: Option<TournamentId>,
) -> Result<Vec<Match>, TournamentError>
where
    S: MatchStore + ?Sized,
{
    let mut matches = matches_of(store, participant, tournament)?;
    matches.sort_by(|a, b| (b.date, b.round).cmp(&(a.date, a.round)));
    Ok(matches)
}
