//! Round advancement: collect the winners of the completed round, pair them for the next one,
//! or crown the champion.

use crate::config::{EngineConfig, PairingPolicy};
use crate::logic::lifecycle::{
    authorize, conflict_as, load_tournament, require_state, round_commit,
};
use crate::models::{
    Caller, Match, Participant, Tournament, TournamentError, TournamentId, TournamentState,
};
use crate::store::{MatchStore, TournamentStore};
use chrono::{Days, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a successful advance produced.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    /// The next round's matches, all scheduled.
    NextRound { round: u32, matches: Vec<Match> },
    /// A single winner remained; the tournament is finished.
    Champion { champion: Participant },
}

/// Highest round holding at least one finished match.
pub fn current_round(matches: &[Match]) -> Option<u32> {
    matches
        .iter()
        .filter(|m| m.is_finished())
        .map(|m| m.round)
        .max()
}

/// Nominal date of `round`: the start date for round 1, then `interval_days` per round.
pub fn round_date(start: NaiveDate, round: u32, interval_days: u64) -> NaiveDate {
    let offset = u64::from(round.saturating_sub(1)) * interval_days;
    start.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX)
}

/// Pair round winners for the next round. `winners` must be ordered by position.
pub fn pair_winners<R: Rng + ?Sized>(
    mut winners: Vec<Participant>,
    policy: PairingPolicy,
    rng: &mut R,
) -> Vec<(Participant, Participant)> {
    if policy == PairingPolicy::Redraw {
        winners.shuffle(rng);
    }
    if winners.len() % 2 != 0 {
        log::warn!("Odd number of winners ({}), last one left unpaired", winners.len());
    }
    let mut it = winners.into_iter();
    let mut pairs = Vec::new();
    while let (Some(a), Some(b)) = (it.next(), it.next()) {
        pairs.push((a, b));
    }
    pairs
}

/// Lay out the matches of `round` from paired winners, positions from 1.
pub fn next_round_matches(
    tournament: &Tournament,
    round: u32,
    pairs: Vec<(Participant, Participant)>,
    interval_days: u64,
) -> Vec<Match> {
    let date = round_date(tournament.start_date, round, interval_days);
    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| Match::scheduled(tournament.id, round, i as u32 + 1, date, a, b))
        .collect()
}

/// Advance an in-progress tournament past its latest completed round.
///
/// Fails with `NoCompletedRound` when nothing is finished yet, and with `IncompleteRound` while
/// any match of the latest round is undecided or the following round already exists. With a
/// single winner left the tournament moves to `Finished` and that winner is returned.
pub fn advance_round<S, R>(
    store: &S,
    tournament_id: TournamentId,
    caller: &Caller,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Advance, TournamentError>
where
    S: TournamentStore + MatchStore + ?Sized,
    R: Rng + ?Sized,
{
    let tournament = load_tournament(store, tournament_id)?;
    authorize(caller, &tournament)?;
    require_state(&tournament, TournamentState::InProgress)?;

    let all = store.existing_matches(tournament_id)?;
    let round = current_round(&all).ok_or(TournamentError::NoCompletedRound)?;
    if all.iter().any(|m| m.round == round && !m.is_finished()) {
        return Err(TournamentError::IncompleteRound { round });
    }
    let next = round + 1;
    if all.iter().any(|m| m.round >= next) {
        return Err(TournamentError::IncompleteRound { round: next });
    }

    let mut winners = Vec::new();
    for m in store.finished_matches(tournament_id, round)? {
        let w = m.winning_participant().cloned().ok_or_else(|| {
            TournamentError::InvalidResult(format!("match {} finished without a winner", m.id))
        })?;
        winners.push(w);
    }

    if winners.len() < 2 {
        let champion = winners
            .into_iter()
            .next()
            .ok_or(TournamentError::NoCompletedRound)?;
        let commit = round_commit(&tournament, TournamentState::Finished, Vec::new())?;
        store
            .commit_round(tournament_id, commit)
            .map_err(|e| conflict_as(e, TournamentError::IncompleteRound { round }))?;
        log::info!(
            "Tournament {} finished, champion {} ({})",
            tournament_id,
            champion.name,
            champion.id
        );
        return Ok(Advance::Champion { champion });
    }

    let pairs = pair_winners(winners, config.pairing, rng);
    let matches = next_round_matches(&tournament, next, pairs, config.round_interval_days);
    let commit = round_commit(&tournament, TournamentState::InProgress, matches.clone())?;
    store
        .commit_round(tournament_id, commit)
        .map_err(|e| conflict_as(e, TournamentError::IncompleteRound { round: next }))?;

    log::info!(
        "Tournament {} advanced to round {} with {} matches",
        tournament_id,
        next,
        matches.len()
    );
    Ok(Advance::NextRound {
        round: next,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn named(n: usize) -> Vec<Participant> {
        (0..n).map(|i| Participant::new(format!("W{i}"))).collect()
    }

    #[test]
    fn position_pairing_keeps_bracket_order() {
        let winners = named(4);
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = pair_winners(winners.clone(), PairingPolicy::BracketPosition, &mut rng);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], (winners[0].clone(), winners[1].clone()));
        assert_eq!(pairs[1], (winners[2].clone(), winners[3].clone()));
    }

    #[test]
    fn redraw_pairing_uses_every_winner_once() {
        let winners = named(8);
        let mut rng = StdRng::seed_from_u64(99);
        let pairs = pair_winners(winners.clone(), PairingPolicy::Redraw, &mut rng);
        assert_eq!(pairs.len(), 4);
        let mut ids: Vec<_> = pairs.iter().flat_map(|(a, b)| [a.id, b.id]).collect();
        ids.sort();
        let mut expected: Vec<_> = winners.iter().map(|w| w.id).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn round_dates_step_by_interval() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert_eq!(round_date(start, 1, 2), start);
        assert_eq!(round_date(start, 2, 2), NaiveDate::from_ymd_opt(2025, 5, 12).unwrap());
        assert_eq!(round_date(start, 4, 2), NaiveDate::from_ymd_opt(2025, 5, 16).unwrap());
    }

    #[test]
    fn current_round_ignores_unfinished() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let t = Tournament::new("Cup", start, uuid::Uuid::new_v4());
        let p = named(3);
        let r1 = Match::bye(t.id, 1, 1, start, p[0].clone());
        let r2 = Match::scheduled(t.id, 2, 1, start, p[1].clone(), p[2].clone());
        assert_eq!(current_round(&[r1, r2]), Some(1));
        assert_eq!(current_round(&[]), None);
    }
}
