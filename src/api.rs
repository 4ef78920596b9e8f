//! REST API: thin actix-web handlers over the engines in [`crate::logic`].
//!
//! Every handler takes the store lock for the whole operation. Errors come back as
//! `{ "error": "<message>" }` with a status derived from the error kind.

use crate::logic::{self, GameMutation, GenerateOptions, MatchupUpdate, TeamSlot};
use crate::models::{
    BracketId, Game, GameId, GameSlot, LeagueError, Lineup, MatchId, MatchLineups, PlayerId,
    Result, Round, RoundId, StopId, TeamId, TeamPosition,
};
use crate::store::LeagueStore;
use actix_web::{
    delete, get, http::StatusCode, patch, post, put,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Shared state: the whole league behind one lock.
pub type AppState = Data<RwLock<LeagueStore>>;

/// Register every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_get_roster)
        .service(api_put_roster)
        .service(api_remove_roster_player)
        .service(api_copy_roster)
        .service(api_unique_count)
        .service(api_get_schedule)
        .service(api_generate_schedule)
        .service(api_delete_schedule)
        .service(api_save_stop_lineups)
        .service(api_put_match_lineup)
        .service(api_swap_teams)
        .service(api_update_matchups)
        .service(api_confirm_matchups)
        .service(api_move_round)
        .service(api_delete_round)
        .service(api_patch_game)
        .service(api_create_tiebreaker)
        .service(api_set_forfeit)
        .service(api_decide_match)
        .service(api_match_outcome);
}

pub fn status_of(err: &LeagueError) -> StatusCode {
    match err {
        LeagueError::NotFound { .. } => StatusCode::NOT_FOUND,
        LeagueError::CrossBracketConflict { .. }
        | LeagueError::MatchLocked { .. }
        | LeagueError::MatchInProgress { .. }
        | LeagueError::AlreadyGenerated { .. }
        | LeagueError::InvalidTransition { .. }
        | LeagueError::ConcurrentModification { .. }
        | LeagueError::AlreadyForfeited { .. } => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn error_response(err: &LeagueError) -> HttpResponse {
    let status = status_of(err);
    if status == StatusCode::CONFLICT {
        log::debug!("Rejected with conflict: {err}");
    }
    HttpResponse::build(status).json(serde_json::json!({ "error": err.to_string() }))
}

fn read<T, F>(state: &AppState, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&LeagueStore) -> Result<T>,
{
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match f(&*g) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

fn write<T, F>(state: &AppState, f: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(&mut LeagueStore) -> Result<T>,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match f(&mut *g) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

// Read models.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: GameId,
    pub slot: GameSlot,
    pub status: &'static str,
    pub is_complete: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub team_a_score: Option<u32>,
    pub team_b_score: Option<u32>,
    pub team_a_lineup: Option<[PlayerId; 2]>,
    pub team_b_lineup: Option<[PlayerId; 2]>,
    pub court_number: Option<String>,
    pub version: u64,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            slot: game.slot,
            status: game.state.name(),
            is_complete: game.is_complete(),
            started_at: game.started_at(),
            ended_at: game.ended_at(),
            team_a_score: game.team_a_score,
            team_b_score: game.team_b_score,
            team_a_lineup: game.team_a_lineup,
            team_b_lineup: game.team_b_lineup,
            court_number: game.court_number.clone(),
            version: game.version,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub id: MatchId,
    pub team_a: Option<TeamRef>,
    pub team_b: Option<TeamRef>,
    pub is_bye: bool,
    pub forfeit: Option<TeamPosition>,
    pub points_winner: Option<TeamPosition>,
    pub lineups: Option<MatchLineups>,
    pub games: Vec<GameView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketGroupView {
    pub bracket_id: BracketId,
    pub bracket_name: String,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub id: RoundId,
    pub idx: u32,
    pub brackets: Vec<BracketGroupView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub stop_id: StopId,
    pub rounds: Vec<RoundView>,
}

fn team_ref(store: &LeagueStore, team_id: Option<TeamId>) -> Result<Option<TeamRef>> {
    team_id
        .map(|id| {
            store.team(id).map(|t| TeamRef {
                id: t.id,
                name: t.name.clone(),
            })
        })
        .transpose()
}

fn round_view(store: &LeagueStore, round: &Round, only: Option<BracketId>) -> Result<RoundView> {
    let mut brackets = Vec::new();
    for group in &round.brackets {
        if only.is_some_and(|b| b != group.bracket_id) {
            continue;
        }
        let mut matches = Vec::with_capacity(group.matches.len());
        for match_id in &group.matches {
            let m = store.get_match(*match_id)?;
            matches.push(MatchView {
                id: m.id,
                team_a: team_ref(store, m.team_a)?,
                team_b: team_ref(store, m.team_b)?,
                is_bye: m.is_bye(),
                forfeit: m.forfeit,
                points_winner: m.points_winner,
                lineups: m.lineups,
                games: store
                    .games_of(m.id)?
                    .into_iter()
                    .map(GameView::from)
                    .collect(),
            });
        }
        brackets.push(BracketGroupView {
            bracket_id: group.bracket_id,
            bracket_name: store.bracket(group.bracket_id)?.name.clone(),
            matches,
        });
    }
    Ok(RoundView {
        id: round.id,
        idx: round.idx,
        brackets,
    })
}

/// Rounds of a stop with their matches and games, optionally limited to one bracket.
pub fn schedule_view(
    store: &LeagueStore,
    stop_id: StopId,
    only: Option<BracketId>,
) -> Result<ScheduleView> {
    store.stop(stop_id)?;
    let mut rounds = Vec::new();
    for round in store.rounds_of(stop_id) {
        let view = round_view(store, round, only)?;
        if only.is_none() || !view.brackets.is_empty() {
            rounds.push(view);
        }
    }
    Ok(ScheduleView { stop_id, rounds })
}

// Paths and bodies.

#[derive(Deserialize)]
struct StopTeamPath {
    stop_id: StopId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct StopTeamPlayerPath {
    stop_id: StopId,
    team_id: TeamId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct TeamPath {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct StopPath {
    stop_id: StopId,
}

#[derive(Deserialize)]
struct RoundPath {
    round_id: RoundId,
}

#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

#[derive(Deserialize)]
struct GamePath {
    game_id: GameId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterBody {
    player_ids: Vec<PlayerId>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopyRosterBody {
    from_stop_id: StopId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleQuery {
    #[serde(default)]
    bracket_id: Option<BracketId>,
    #[serde(default)]
    compact: bool,
}

#[derive(Deserialize)]
struct StopLineupsBody {
    lineups: HashMap<MatchId, HashMap<TeamId, Lineup>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchLineupBody {
    team_a: Lineup,
    team_b: Lineup,
}

#[derive(Deserialize)]
struct SwapBody {
    a: TeamSlot,
    b: TeamSlot,
}

#[derive(Deserialize)]
struct MatchupsBody {
    updates: Vec<MatchupUpdate>,
}

#[derive(Deserialize)]
struct MoveRoundBody {
    idx: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiebreakerBody {
    create_tiebreaker: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionBody {
    decide_by_points: bool,
}

#[derive(Deserialize)]
struct ForfeitBody {
    team: Option<TeamPosition>,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

// Handlers.

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "pickleball-tournament-web",
    })
}

/// Roster for a team at a stop, with the cross-stop count and cap.
#[get("/api/stops/{stop_id}/teams/{team_id}/roster")]
async fn api_get_roster(state: AppState, path: Path<StopTeamPath>) -> HttpResponse {
    read(&state, |store| {
        logic::roster_summary(store, path.stop_id, path.team_id)
    })
}

/// Replace the roster for a team at a stop.
#[put("/api/stops/{stop_id}/teams/{team_id}/roster")]
async fn api_put_roster(
    state: AppState,
    path: Path<StopTeamPath>,
    body: Json<RosterBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::set_stop_roster(store, path.stop_id, path.team_id, &body.player_ids, body.limit)
    })
}

#[delete("/api/stops/{stop_id}/teams/{team_id}/roster/{player_id}")]
async fn api_remove_roster_player(state: AppState, path: Path<StopTeamPlayerPath>) -> HttpResponse {
    write(&state, |store| {
        logic::remove_player_from_stop_roster(store, path.stop_id, path.team_id, path.player_id)?;
        logic::roster_summary(store, path.stop_id, path.team_id)
    })
}

/// Copy another stop's roster onto this one.
#[post("/api/stops/{stop_id}/teams/{team_id}/roster/copy")]
async fn api_copy_roster(
    state: AppState,
    path: Path<StopTeamPath>,
    body: Json<CopyRosterBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::copy_from_previous_stop(store, path.team_id, body.from_stop_id, path.stop_id)
    })
}

#[get("/api/teams/{team_id}/unique-count")]
async fn api_unique_count(state: AppState, path: Path<TeamPath>) -> HttpResponse {
    read(&state, |store| {
        Ok(serde_json::json!({
            "teamId": path.team_id,
            "count": logic::bracket_unique_count(store, path.team_id)?,
            "cap": logic::roster_cap(store, path.team_id)?,
        }))
    })
}

#[get("/api/stops/{stop_id}/schedule")]
async fn api_get_schedule(
    state: AppState,
    path: Path<StopPath>,
    query: Query<ScheduleQuery>,
) -> HttpResponse {
    read(&state, |store| schedule_view(store, path.stop_id, query.bracket_id))
}

/// Generate the stop's schedule. Body is optional: `{ overwrite, slots }`.
#[post("/api/stops/{stop_id}/schedule")]
async fn api_generate_schedule(
    state: AppState,
    path: Path<StopPath>,
    body: Option<Json<GenerateOptions>>,
) -> HttpResponse {
    let options = body.map(Json::into_inner).unwrap_or_default();
    write(&state, |store| logic::generate(store, path.stop_id, &options))
}

#[delete("/api/stops/{stop_id}/schedule")]
async fn api_delete_schedule(
    state: AppState,
    path: Path<StopPath>,
    query: Query<ScheduleQuery>,
) -> HttpResponse {
    write(&state, |store| {
        logic::delete_schedule(store, path.stop_id, query.bracket_id, query.compact)
    })
}

/// Save lineups for many matches of a stop at once.
#[post("/api/stops/{stop_id}/lineups")]
async fn api_save_stop_lineups(
    state: AppState,
    path: Path<StopPath>,
    body: Json<StopLineupsBody>,
) -> HttpResponse {
    write(&state, |store| {
        let saved = logic::save_stop_lineups(store, path.stop_id, &body.lineups)?;
        Ok(serde_json::json!({ "saved": saved }))
    })
}

#[put("/api/matches/{match_id}/lineup")]
async fn api_put_match_lineup(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchLineupBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::assign_lineup(store, path.match_id, body.team_a, body.team_b)
    })
}

/// Swap two team slots in a round; returns the round as it now stands.
#[post("/api/rounds/{round_id}/swap")]
async fn api_swap_teams(
    state: AppState,
    path: Path<RoundPath>,
    body: Json<SwapBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::swap_teams(store, path.round_id, body.a, body.b)?;
        let store = &*store;
        round_view(store, store.round(path.round_id)?, None)
    })
}

#[patch("/api/rounds/{round_id}/matchups")]
async fn api_update_matchups(
    state: AppState,
    path: Path<RoundPath>,
    body: Json<MatchupsBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::apply_matchup_updates(store, path.round_id, &body.updates)?;
        let store = &*store;
        round_view(store, store.round(path.round_id)?, None)
    })
}

#[post("/api/rounds/{round_id}/confirm")]
async fn api_confirm_matchups(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    read(&state, |store| {
        logic::confirm_matchups(store, path.round_id)?;
        Ok(serde_json::json!({ "ok": true }))
    })
}

#[patch("/api/rounds/{round_id}")]
async fn api_move_round(
    state: AppState,
    path: Path<RoundPath>,
    body: Json<MoveRoundBody>,
) -> HttpResponse {
    write(&state, |store| {
        let idx = logic::move_round(store, path.round_id, body.idx)?;
        Ok(serde_json::json!({ "id": path.round_id, "idx": idx }))
    })
}

#[delete("/api/rounds/{round_id}")]
async fn api_delete_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    write(&state, |store| {
        logic::delete_round(store, path.round_id)?;
        Ok(serde_json::json!({ "ok": true }))
    })
}

/// Partial update of a game: court, start, scores, completion.
#[patch("/api/games/{game_id}")]
async fn api_patch_game(
    state: AppState,
    path: Path<GamePath>,
    body: Json<GameMutation>,
) -> HttpResponse {
    write(&state, |store| {
        let outcome = logic::apply_game_mutation(store, path.game_id, &body, Utc::now())?;
        Ok(serde_json::json!({
            "game": GameView::from(&outcome.game),
            "tiebreaker": outcome.tiebreaker,
        }))
    })
}

#[post("/api/matches/{match_id}/tiebreaker")]
async fn api_create_tiebreaker(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<TiebreakerBody>,
) -> HttpResponse {
    write(&state, |store| {
        if !body.create_tiebreaker {
            return Err(LeagueError::InvalidInput(
                "createTiebreaker must be true".into(),
            ));
        }
        let game_id = logic::create_tiebreaker(store, path.match_id)?;
        Ok(GameView::from(store.game(game_id)?))
    })
}

/// Record or clear a forfeit (`{ "team": "A" | "B" | null }`); returns the match outcome.
#[put("/api/matches/{match_id}/forfeit")]
async fn api_set_forfeit(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ForfeitBody>,
) -> HttpResponse {
    write(&state, |store| {
        logic::set_forfeit(store, path.match_id, body.team)?;
        logic::match_outcome(store, path.match_id)
    })
}

/// Settle a 2-2 match on total points (`{ "decideByPoints": true }`); returns the outcome.
#[post("/api/matches/{match_id}/decision")]
async fn api_decide_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<DecisionBody>,
) -> HttpResponse {
    write(&state, |store| {
        if !body.decide_by_points {
            return Err(LeagueError::InvalidInput("decideByPoints must be true".into()));
        }
        logic::decide_by_points(store, path.match_id)
    })
}

#[get("/api/matches/{match_id}/outcome")]
async fn api_match_outcome(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    read(&state, |store| logic::match_outcome(store, path.match_id))
}
