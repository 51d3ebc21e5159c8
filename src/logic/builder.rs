//! Bracket building: size the bracket, draw the seeding, place byes, emit round 1.

use crate::logic::lifecycle::{
    authorize, conflict_as, load_tournament, require_state, round_commit,
};
use crate::models::{
    Caller, Match, Participant, Tournament, TournamentError, TournamentId, TournamentState,
};
use crate::store::{MatchStore, ParticipantRegistry, TournamentStore};
use rand::seq::SliceRandom;
use rand::Rng;

/// Fewest accepted participants a bracket can be built from.
pub const MIN_PARTICIPANTS: usize = 2;

/// Smallest power of two holding `participants` slots.
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

/// Which of the `pairs` first-round positions carry a bye, spread evenly over the bracket.
///
/// Exactly `byes` entries are `true`. `byes` must be below `pairs`, which always holds for a
/// bracket sized by [`bracket_size`] since fewer than half its slots are empty.
pub fn bye_layout(pairs: usize, byes: usize) -> Vec<bool> {
    debug_assert!(byes < pairs.max(1));
    (0..pairs)
        .map(|i| (i + 1) * byes / pairs > i * byes / pairs)
        .collect()
}

/// Shuffle `participants` and lay them out as round-1 matches.
///
/// Positions run `1..=bracket_size/2`. A bye position holds one participant and is created
/// finished with that participant as winner; every other position is a scheduled pairing.
pub fn draw_first_round<R: Rng + ?Sized>(
    tournament: &Tournament,
    mut participants: Vec<Participant>,
    rng: &mut R,
) -> Vec<Match> {
    let size = bracket_size(participants.len());
    let pairs = size / 2;
    let byes = size - participants.len();
    participants.shuffle(rng);

    let mut draw = participants.into_iter();
    let mut matches = Vec::with_capacity(pairs);
    for (i, is_bye) in bye_layout(pairs, byes).into_iter().enumerate() {
        let position = i as u32 + 1;
        let date = tournament.start_date;
        let first = draw.next();
        let second = if is_bye { None } else { draw.next() };
        let m = match (first, second) {
            (Some(a), Some(b)) => Match::scheduled(tournament.id, 1, position, date, a, b),
            (Some(a), None) => Match::bye(tournament.id, 1, position, date, a),
            // The layout never leaves a position without a participant.
            (None, _) => continue,
        };
        matches.push(m);
    }
    matches
}

/// Build the bracket of a planned tournament from its accepted participants.
///
/// Checks, in order: tournament exists, caller is organizer or administrator, tournament is
/// planned, at least two accepted participants, no matches exist yet. A tournament that left
/// `Planned` with matches stored reports `AlreadyBuilt` rather than `InvalidState`. Round 1 and
/// the move to `InProgress` are committed in one check-and-set write.
pub fn build_bracket<S, R>(
    store: &S,
    tournament_id: TournamentId,
    caller: &Caller,
    rng: &mut R,
) -> Result<Vec<Match>, TournamentError>
where
    S: TournamentStore + MatchStore + ParticipantRegistry + ?Sized,
    R: Rng + ?Sized,
{
    let tournament = load_tournament(store, tournament_id)?;
    authorize(caller, &tournament)?;
    if tournament.state != TournamentState::Planned
        && !store.existing_matches(tournament_id)?.is_empty()
    {
        return Err(TournamentError::AlreadyBuilt);
    }
    require_state(&tournament, TournamentState::Planned)?;

    let accepted = store.accepted_participants(tournament_id)?;
    if accepted.len() < MIN_PARTICIPANTS {
        return Err(TournamentError::InsufficientParticipants {
            needed: MIN_PARTICIPANTS,
            current: accepted.len(),
        });
    }
    if !store.existing_matches(tournament_id)?.is_empty() {
        return Err(TournamentError::AlreadyBuilt);
    }

    let size = bracket_size(accepted.len());
    let byes = size - accepted.len();
    let matches = draw_first_round(&tournament, accepted, rng);

    let commit = round_commit(&tournament, TournamentState::InProgress, matches.clone())?;
    store
        .commit_round(tournament_id, commit)
        .map_err(|e| conflict_as(e, TournamentError::AlreadyBuilt))?;

    log::info!(
        "Built bracket for tournament {}: size {}, {} matches, {} byes",
        tournament_id,
        size,
        matches.len(),
        byes
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn bracket_size_rounds_up_to_power_of_two() {
        assert_eq!(bracket_size(2), 2);
        assert_eq!(bracket_size(3), 4);
        assert_eq!(bracket_size(5), 8);
        assert_eq!(bracket_size(8), 8);
        assert_eq!(bracket_size(9), 16);
        assert_eq!(bracket_size(33), 64);
    }

    #[test]
    fn bye_layout_places_exact_count() {
        for size in [2usize, 4, 8, 16, 32, 64] {
            let pairs = size / 2;
            for byes in 0..pairs {
                let layout = bye_layout(pairs, byes);
                assert_eq!(layout.len(), pairs);
                assert_eq!(layout.iter().filter(|b| **b).count(), byes);
            }
        }
    }

    #[test]
    fn bye_layout_spreads_over_halves() {
        // 10 players in a 16 bracket: 6 byes over 8 positions, 3 in each half.
        let layout = bye_layout(8, 6);
        assert_eq!(layout[..4].iter().filter(|b| **b).count(), 3);
        assert_eq!(layout[4..].iter().filter(|b| **b).count(), 3);
    }

    #[test]
    fn first_round_never_pairs_two_empty_slots() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let t = Tournament::new("Club Cup", start, Uuid::new_v4());
        let mut rng = StdRng::seed_from_u64(7);
        for n in 2..=40 {
            let players: Vec<_> = (0..n).map(|i| Participant::new(format!("P{i}"))).collect();
            let matches = draw_first_round(&t, players.clone(), &mut rng);
            assert_eq!(matches.len(), bracket_size(n) / 2);
            let seen: HashSet<_> = matches
                .iter()
                .flat_map(|m| m.participants())
                .map(|p| p.id)
                .collect();
            assert_eq!(seen.len(), n);
            for m in &matches {
                assert!(m.player_1.is_some());
                assert_eq!(m.date, start);
            }
        }
    }
}
