//! JSON HTTP surface over the bracket engine.
//!
//! The caller is identified by two plain headers, `X-User-Id` (uuid) and `X-User-Role`
//! (`athlete`, `coach` or `administrator`). Verifying who sent them is left to whatever sits
//! in front of this service.

use crate::engine::BracketEngine;
use crate::models::{
    Caller, EnrollmentState, Participant, ParticipantId, Role, Tournament, TournamentError,
    TournamentId, TournamentKind, DEFAULT_CAPACITY,
};
use crate::store::MemoryStore;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path, Query},
    HttpRequest, HttpResponse, Responder,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared engine over the in-memory store.
pub type AppState = Data<BracketEngine<MemoryStore>>;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    start_date: NaiveDate,
    #[serde(default)]
    surface: String,
    #[serde(default)]
    kind: TournamentKind,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Deserialize)]
struct EnrollBody {
    /// Defaults to the caller (self-enrollment).
    #[serde(default)]
    participant_id: Option<ParticipantId>,
    name: String,
}

#[derive(Deserialize)]
struct EnrollmentStateBody {
    state: EnrollmentState,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: ParticipantId,
    #[serde(default)]
    score: Option<String>,
}

#[derive(Deserialize)]
struct TournamentFilter {
    #[serde(default)]
    tournament: Option<TournamentId>,
}

/// Path segment: a single id (tournament, match, enrollment or participant).
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

/// Map an engine error to its HTTP status.
pub fn error_response(e: &TournamentError) -> HttpResponse {
    let body = error_body(e.to_string());
    match e {
        TournamentError::NotFound { .. } => HttpResponse::NotFound().json(body),
        TournamentError::Forbidden => HttpResponse::Forbidden().json(body),
        TournamentError::AlreadyBuilt
        | TournamentError::IncompleteRound { .. }
        | TournamentError::DuplicateEnrollment => HttpResponse::Conflict().json(body),
        TournamentError::Internal(err) => {
            log::error!("Store failure: {}", err);
            HttpResponse::InternalServerError().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, HttpResponse> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            HttpResponse::BadRequest().json(error_body(format!("Missing {name} header")))
        })
}

/// Read the caller from `X-User-Id` / `X-User-Role`.
fn caller_from(req: &HttpRequest) -> Result<Caller, HttpResponse> {
    let id = header(req, USER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| HttpResponse::BadRequest().json(error_body("Malformed X-User-Id header")))?;
    let role = header(req, USER_ROLE_HEADER)?
        .parse::<Role>()
        .map_err(|e| HttpResponse::BadRequest().json(error_body(e.to_string())))?;
    Ok(Caller::new(id, role))
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(v) => HttpResponse::Ok().json(v),
        Err(e) => error_response(&e),
    }
}

fn respond_created<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(v) => HttpResponse::Created().json(v),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tennis-bracket",
    })
}

/// List all tournaments.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    respond(state.store().tournaments().map_err(TournamentError::from))
}

/// Create a planned tournament organized by the caller.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    req: HttpRequest,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    let tournament = Tournament::new(body.name.trim(), body.start_date, caller.id)
        .with_surface(body.surface)
        .with_kind(body.kind)
        .with_capacity(body.capacity);
    respond_created(state.create_tournament(tournament, &caller))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.tournament(path.id))
}

/// Delete a tournament together with its matches and enrollments.
#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond(state.delete_tournament(path.id, &caller))
}

#[post("/api/tournaments/{id}/enrollments")]
async fn api_enroll(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<EnrollBody>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let participant_id = body.participant_id.unwrap_or(caller.id);
    let participant = Participant::with_id(participant_id, body.name.trim());
    respond_created(state.enroll(path.id, participant, &caller))
}

#[get("/api/tournaments/{id}/enrollments")]
async fn api_tournament_enrollments(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.enrollments(path.id))
}

/// Accept or reject an enrollment.
#[put("/api/enrollments/{id}")]
async fn api_set_enrollment_state(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<EnrollmentStateBody>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond(state.set_enrollment_state(path.id, body.state, &caller))
}

/// Withdraw an enrollment (the athlete themselves, the organizer, or an administrator).
#[delete("/api/enrollments/{id}")]
async fn api_withdraw(state: AppState, req: HttpRequest, path: Path<IdPath>) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond(state.withdraw(path.id, &caller))
}

/// Build round 1 from the accepted enrollments.
#[post("/api/tournaments/{id}/bracket")]
async fn api_build_bracket(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond_created(state.build_bracket(path.id, &caller))
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.bracket(path.id))
}

/// Champion of a finished tournament (`null` while running).
#[get("/api/tournaments/{id}/champion")]
async fn api_champion(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.champion(path.id))
}

/// Advance past the latest completed round (next round or champion).
#[post("/api/tournaments/{id}/bracket/advance")]
async fn api_advance_round(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond(state.advance_round(path.id, &caller))
}

#[post("/api/matches/{id}/start")]
async fn api_start_match(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    respond(state.start_match(path.id, &caller))
}

#[put("/api/matches/{id}/result")]
async fn api_record_result(
    state: AppState,
    req: HttpRequest,
    path: Path<IdPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let caller = match caller_from(&req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let body = body.into_inner();
    respond(state.record_result(path.id, body.winner, body.score, &caller))
}

/// Next scheduled match of a participant (`null` when none).
#[get("/api/participants/{id}/next-match")]
async fn api_next_match(
    state: AppState,
    path: Path<IdPath>,
    filter: Query<TournamentFilter>,
) -> HttpResponse {
    respond(state.next_match(path.id, filter.tournament))
}

#[get("/api/participants/{id}/history")]
async fn api_history(
    state: AppState,
    path: Path<IdPath>,
    filter: Query<TournamentFilter>,
) -> HttpResponse {
    respond(state.history(path.id, filter.tournament))
}

#[get("/api/participants/{id}/enrollments")]
async fn api_participant_enrollments(state: AppState, path: Path<IdPath>) -> HttpResponse {
    respond(state.participant_enrollments(path.id))
}

/// Register every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_list_tournaments)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_delete_tournament)
        .service(api_enroll)
        .service(api_tournament_enrollments)
        .service(api_set_enrollment_state)
        .service(api_withdraw)
        .service(api_build_bracket)
        .service(api_get_bracket)
        .service(api_champion)
        .service(api_advance_round)
        .service(api_start_match)
        .service(api_record_result)
        .service(api_next_match)
        .service(api_history)
        .service(api_participant_enrollments);
}
