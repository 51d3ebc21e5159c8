//! Enrollment workflow: athletes join planned tournaments, organizers accept or reject them.

use crate::logic::lifecycle::{authorize, load_tournament, require_state};
use crate::models::{
    Caller, Enrollment, EnrollmentId, EnrollmentState, Entity, Participant, ParticipantId,
    Tournament, TournamentError, TournamentId, TournamentKind, TournamentState,
};
use crate::store::{EnrollmentStore, StoreError, TournamentStore};

fn accepted_count(enrollments: &[Enrollment]) -> usize {
    enrollments.iter().filter(|e| e.is_accepted()).count()
}

fn ensure_capacity(
    tournament: &Tournament,
    enrollments: &[Enrollment],
) -> Result<(), TournamentError> {
    if accepted_count(enrollments) >= tournament.capacity {
        return Err(TournamentError::TournamentFull);
    }
    Ok(())
}

/// Enroll `participant` into a planned tournament.
///
/// Open tournaments: athletes enroll themselves (administrators may enroll anyone) and are
/// accepted right away. Closed tournaments: only the organizer or an administrator enrolls,
/// and the enrollment starts pending.
pub fn enroll<S>(
    store: &S,
    tournament_id: TournamentId,
    participant: Participant,
    caller: &Caller,
) -> Result<Enrollment, TournamentError>
where
    S: TournamentStore + EnrollmentStore + ?Sized,
{
    let tournament = load_tournament(store, tournament_id)?;
    require_state(&tournament, TournamentState::Planned)?;

    let state = match tournament.kind {
        TournamentKind::Open => {
            if !caller.is_admin() && caller.id != participant.id {
                return Err(TournamentError::Forbidden);
            }
            EnrollmentState::Accepted
        }
        TournamentKind::Closed => {
            authorize(caller, &tournament)?;
            EnrollmentState::Pending
        }
    };

    let existing = store.enrollments(tournament_id)?;
    if existing.iter().any(|e| e.participant.id == participant.id) {
        return Err(TournamentError::DuplicateEnrollment);
    }
    ensure_capacity(&tournament, &existing)?;

    let enrollment = Enrollment::new(tournament_id, participant, state);
    store
        .insert_enrollment(enrollment.clone())
        .map_err(|e| match e {
            StoreError::Conflict(_) => TournamentError::DuplicateEnrollment,
            other => other.into(),
        })?;
    log::info!(
        "Enrolled {} in tournament {} ({:?})",
        enrollment.participant.name,
        tournament_id,
        enrollment.state
    );
    Ok(enrollment)
}

/// Accept, reject, or reset an enrollment while the tournament is still planned.
/// Only the organizer or an administrator decides.
pub fn set_enrollment_state<S>(
    store: &S,
    enrollment_id: EnrollmentId,
    state: EnrollmentState,
    caller: &Caller,
) -> Result<Enrollment, TournamentError>
where
    S: TournamentStore + EnrollmentStore + ?Sized,
{
    let mut enrollment = store
        .find_enrollment(enrollment_id)?
        .ok_or(TournamentError::NotFound {
            entity: Entity::Enrollment,
            id: enrollment_id,
        })?;
    let tournament = load_tournament(store, enrollment.tournament)?;
    authorize(caller, &tournament)?;
    require_state(&tournament, TournamentState::Planned)?;

    if state == EnrollmentState::Accepted && !enrollment.is_accepted() {
        ensure_capacity(&tournament, &store.enrollments(tournament.id)?)?;
    }
    enrollment.state = state;
    store.update_enrollment(&enrollment)?;
    log::info!("Enrollment {} is now {:?}", enrollment.id, state);
    Ok(enrollment)
}

/// Enrollments of a tournament, in the order they were made.
pub fn tournament_enrollments<S>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Vec<Enrollment>, TournamentError>
where
    S: TournamentStore + EnrollmentStore + ?Sized,
{
    load_tournament(store, tournament_id)?;
    Ok(store.enrollments(tournament_id)?)
}

/// Every enrollment of `participant`, oldest first.
pub fn participant_enrollments<S>(
    store: &S,
    participant: ParticipantId,
) -> Result<Vec<Enrollment>, TournamentError>
where
    S: EnrollmentStore + ?Sized,
{
    let mut enrollments = store.participant_enrollments(participant)?;
    enrollments.sort_by_key(|e| e.enrolled_at);
    Ok(enrollments)
}

/// Withdraw an enrollment before the bracket is built. Athletes withdraw themselves; the
/// organizer or an administrator may remove anyone.
pub fn withdraw<S>(
    store: &S,
    enrollment_id: EnrollmentId,
    caller: &Caller,
) -> Result<Enrollment, TournamentError>
where
    S: TournamentStore + EnrollmentStore + ?Sized,
{
    let not_found = || TournamentError::NotFound {
        entity: Entity::Enrollment,
        id: enrollment_id,
    };
    let enrollment = store.find_enrollment(enrollment_id)?.ok_or_else(not_found)?;
    let tournament = load_tournament(store, enrollment.tournament)?;
    if caller.id != enrollment.participant.id {
        authorize(caller, &tournament)?;
    }
    require_state(&tournament, TournamentState::Planned)?;

    let removed = store.delete_enrollment(enrollment_id)?.ok_or_else(not_found)?;
    log::info!(
        "Withdrew {} from tournament {}",
        removed.participant.name,
        removed.tournament
    );
    Ok(removed)
}
