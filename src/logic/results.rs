//! Result recording: the only way a two-participant match is decided.

use crate::logic::lifecycle::{authorize, load_tournament, require_state};
use crate::models::{
    Caller, Entity, Match, MatchId, MatchState, ParticipantId, TournamentError, TournamentState,
};
use crate::store::{MatchStore, TournamentStore};

/// Fetch a match or fail with `NotFound`.
pub fn load_match<S: MatchStore + ?Sized>(
    store: &S,
    id: MatchId,
) -> Result<Match, TournamentError> {
    store.find_match(id)?.ok_or(TournamentError::NotFound {
        entity: Entity::Match,
        id,
    })
}

/// Checks shared by every result operation: match and tournament exist, caller manages the
/// tournament, tournament is in progress, match is a real pairing that is not decided yet.
fn editable_match<S>(
    store: &S,
    match_id: MatchId,
    caller: &Caller,
) -> Result<Match, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
{
    let m = load_match(store, match_id)?;
    let tournament = load_tournament(store, m.tournament)?;
    authorize(caller, &tournament)?;
    require_state(&tournament, TournamentState::InProgress)?;
    if m.is_bye() {
        return Err(TournamentError::InvalidResult(
            "a bye has no result to record".to_string(),
        ));
    }
    if m.is_finished() {
        return Err(TournamentError::InvalidResult(format!(
            "match {} is already decided",
            m.id
        )));
    }
    Ok(m)
}

/// Mark a scheduled match as being played.
pub fn start_match<S>(
    store: &S,
    match_id: MatchId,
    caller: &Caller,
) -> Result<Match, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
{
    let mut m = editable_match(store, match_id, caller)?;
    if m.state == MatchState::InProgress {
        return Ok(m);
    }
    m.state = MatchState::InProgress;
    store.update_match(&m)?;
    log::debug!("Match {} (round {}) started", m.id, m.round);
    Ok(m)
}

/// Record the winner and score of a match. The other participant becomes the loser.
pub fn record_result<S>(
    store: &S,
    match_id: MatchId,
    winner: ParticipantId,
    score: Option<String>,
    caller: &Caller,
) -> Result<Match, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
{
    let mut m = editable_match(store, match_id, caller)?;
    let loser = m.opponent_of(winner).map(|p| p.id).ok_or_else(|| {
        TournamentError::InvalidResult(format!(
            "winner {} is not a participant of match {}",
            winner, m.id
        ))
    })?;
    m.winner = Some(winner);
    m.loser = Some(loser);
    m.score = score.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    m.state = MatchState::Finished;
    store.update_match(&m)?;
    log::info!(
        "Recorded result for match {} (round {}, position {})",
        m.id,
        m.round,
        m.position
    );
    Ok(m)
}
