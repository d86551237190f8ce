//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_DIR, ADMIN_PASSWORD, GDRIVE_CREDENTIALS, LLM_API_KEY.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key, delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use badminton_club_web::storage::mirror::Mirror;
use badminton_club_web::storage::{
    PersistedState, QaEntry, Storage, DATA_FILE, QA_LOG_FILE, VISITOR_FILE,
};
use badminton_club_web::{
    auth, compose_teams, delete_matches, edit_match, head_to_head, llm, player_overview,
    player_trends, record_match, rematch_with_last_teams, team_combinations, Club, MatchId,
    MatchMode, Player, PlayerId, PlayerPool, TeamSide,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Shared application context: the club behind a lock, plus the boundary
/// collaborators. One mutating action runs to completion per lock hold.
struct AppCtx {
    club: RwLock<Club>,
    storage: Storage,
    mirror: Option<Mirror>,
    llm: Option<llm::QueryAdapter>,
}

type AppState = Data<AppCtx>;

/// Admin sessions expire 30 minutes after login.
const ADMIN_SESSION_TIMEOUT_SECS: i64 = 30 * 60;
const ADMIN_SINCE_KEY: &str = "admin_since";
const VISITOR_COUNTED_KEY: &str = "counted";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

#[derive(Deserialize)]
struct ChangePasswordBody {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
    #[serde(default = "default_skill")]
    skill_level: u8,
    #[serde(default = "default_pool")]
    pool: PlayerPool,
}

fn default_skill() -> u8 {
    3
}

fn default_pool() -> PlayerPool {
    PlayerPool::Permanent
}

#[derive(Deserialize)]
struct DrawTeamsBody {
    player_ids: Vec<PlayerId>,
    #[serde(default)]
    mode: MatchMode,
}

#[derive(Deserialize)]
struct RecordMatchBody {
    score_a: u32,
    score_b: u32,
    #[serde(default)]
    notes: String,
}

#[derive(Deserialize)]
struct EditMatchBody {
    score_a: u32,
    score_b: u32,
    winner: TeamSide,
    #[serde(default)]
    notes: String,
}

#[derive(Deserialize)]
struct DeleteMatchesBody {
    ids: Vec<MatchId>,
}

#[derive(Deserialize)]
struct AskBody {
    question: String,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Teams resolved to names for display.
#[derive(Serialize)]
struct TeamsView {
    team_a: Vec<String>,
    team_b: Vec<String>,
}

/// Snapshot of the club for the dashboard (never exposes the password hash).
#[derive(Serialize)]
struct ClubView {
    predefined_players: Vec<Player>,
    temp_players: Vec<Player>,
    current_teams: Option<TeamsView>,
    waiting_queue: Vec<String>,
    match_count: usize,
    is_admin: bool,
}

/// True while the session's admin login is fresh; stale logins are purged.
fn session_is_admin(session: &Session) -> bool {
    match session.get::<i64>(ADMIN_SINCE_KEY) {
        Ok(Some(since)) => {
            if Utc::now().timestamp() - since <= ADMIN_SESSION_TIMEOUT_SECS {
                true
            } else {
                let _ = session.remove(ADMIN_SINCE_KEY);
                false
            }
        }
        _ => false,
    }
}

/// Save the durable state locally (failure logged, not surfaced) and push
/// it to the mirror detached. Call after the club lock is released.
fn persist_and_mirror(ctx: &AppCtx, snapshot: PersistedState) {
    if let Err(e) = ctx.storage.save(&snapshot) {
        log::error!("Failed to save {}: {}", DATA_FILE, e);
    }
    match serde_json::to_vec(&snapshot) {
        Ok(bytes) => mirror_push(ctx, DATA_FILE, bytes),
        Err(e) => log::warn!("Mirror serialization failed: {}", e),
    }
}

/// Push one named file's content to the mirror, detached; failures are
/// logged and dropped.
fn mirror_push(ctx: &AppCtx, name: &'static str, bytes: Vec<u8>) {
    let Some(mirror) = ctx.mirror.clone() else {
        return;
    };
    actix_web::rt::spawn(async move {
        if let Err(e) = mirror.push_file(name, bytes).await {
            log::warn!("Mirror push for {} failed: {}", name, e);
        }
    });
}

/// Mirror a secondary file (Q&A log, visitor counter) from disk after it
/// has been written locally.
fn mirror_secondary(ctx: &AppCtx, name: &'static str, path: std::path::PathBuf) {
    if ctx.mirror.is_none() {
        return;
    }
    match std::fs::read(&path) {
        Ok(bytes) => mirror_push(ctx, name, bytes),
        Err(e) => log::warn!("Could not read {} for mirroring: {}", name, e),
    }
}

fn error_json(msg: impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": msg.to_string() })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "badminton-club-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Dashboard snapshot: both pools, current teams, waiting queue.
#[get("/api/club")]
async fn api_get_club(state: AppState, session: Session) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let names = |ids: &[PlayerId]| -> Vec<String> {
        ids.iter()
            .filter_map(|&id| g.player_name(id).map(str::to_string))
            .collect()
    };
    let view = ClubView {
        predefined_players: g.predefined_players.clone(),
        temp_players: g.temp_players.clone(),
        current_teams: g.current_teams.as_ref().map(|t| TeamsView {
            team_a: names(&t.team_a),
            team_b: names(&t.team_b),
        }),
        waiting_queue: names(&g.waiting_queue),
        match_count: g.match_history.len(),
        is_admin: session_is_admin(&session),
    };
    HttpResponse::Ok().json(view)
}

/// Admin login: verify the shared secret and mark the session.
#[post("/api/admin/login")]
async fn api_admin_login(state: AppState, session: Session, body: Json<LoginBody>) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    if !auth::verify_password(&g, &body.password) {
        return HttpResponse::BadRequest().json(error_json("Incorrect password"));
    }
    drop(g);
    if session.insert(ADMIN_SINCE_KEY, Utc::now().timestamp()).is_err() {
        return HttpResponse::InternalServerError().body("session error");
    }
    HttpResponse::Ok().json(serde_json::json!({ "is_admin": true }))
}

#[post("/api/admin/logout")]
async fn api_admin_logout(session: Session) -> HttpResponse {
    let _ = session.remove(ADMIN_SINCE_KEY);
    HttpResponse::Ok().json(serde_json::json!({ "is_admin": false }))
}

/// Change the admin password (admin only; confirm field checked here).
#[put("/api/admin/password")]
async fn api_change_password(
    state: AppState,
    session: Session,
    body: Json<ChangePasswordBody>,
) -> HttpResponse {
    if !session_is_admin(&session) {
        return HttpResponse::BadRequest().json(error_json("Admin login required"));
    }
    if body.new_password != body.confirm_password {
        return HttpResponse::BadRequest().json(error_json("New passwords do not match"));
    }
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match auth::change_password(&mut g, &body.current_password, &body.new_password) {
        Ok(()) => {
            let snapshot = PersistedState::from_club(&g);
            drop(g);
            persist_and_mirror(&state, snapshot);
            HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Add a player to the permanent or temporary pool (admin only).
#[post("/api/players")]
async fn api_add_player(state: AppState, session: Session, body: Json<AddPlayerBody>) -> HttpResponse {
    let is_admin = session_is_admin(&session);
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.add_player(&body.name, body.skill_level, body.pool, is_admin) {
        Ok(id) => {
            // Temporary players are session-scoped: nothing to persist.
            if body.pool == PlayerPool::Permanent {
                let snapshot = PersistedState::from_club(&g);
                drop(g);
                persist_and_mirror(&state, snapshot);
            }
            HttpResponse::Ok().json(serde_json::json!({ "id": id }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Clear all temporary players (admin only).
#[delete("/api/players/temporary")]
async fn api_clear_temp_players(state: AppState, session: Session) -> HttpResponse {
    let is_admin = session_is_admin(&session);
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.clear_temp_players(is_admin) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Draw teams from the selected pool (everyone can draw).
#[post("/api/teams/draw")]
async fn api_draw_teams(state: AppState, body: Json<DrawTeamsBody>) -> HttpResponse {
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match compose_teams(&mut g, &body.player_ids, body.mode) {
        Ok(teams) => {
            let names = |ids: &[PlayerId]| -> Vec<String> {
                ids.iter()
                    .filter_map(|&id| g.player_name(id).map(str::to_string))
                    .collect()
            };
            let view = TeamsView {
                team_a: names(&teams.team_a),
                team_b: names(&teams.team_b),
            };
            let waiting = names(&g.waiting_queue);
            // Rotation history is durable, so a draw is a persisted change.
            let snapshot = PersistedState::from_club(&g);
            drop(g);
            persist_and_mirror(&state, snapshot);
            HttpResponse::Ok()
                .json(serde_json::json!({ "teams": view, "waiting_queue": waiting }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Reuse the most recent match's teams (no re-draw, no rotation change).
#[post("/api/teams/rematch")]
async fn api_rematch(state: AppState) -> HttpResponse {
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match rematch_with_last_teams(&mut g) {
        Ok(teams) => {
            let names = |ids: &[PlayerId]| -> Vec<String> {
                ids.iter()
                    .filter_map(|&id| g.player_name(id).map(str::to_string))
                    .collect()
            };
            let view = TeamsView {
                team_a: names(&teams.team_a),
                team_b: names(&teams.team_b),
            };
            HttpResponse::Ok().json(serde_json::json!({ "teams": view }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Record the current teams' match result (admin only). A 0-0 result is
/// rejected here as "not a real result".
#[post("/api/matches")]
async fn api_record_match(
    state: AppState,
    session: Session,
    body: Json<RecordMatchBody>,
) -> HttpResponse {
    if body.score_a == 0 && body.score_b == 0 {
        return HttpResponse::BadRequest()
            .json(error_json("Please enter valid scores for the match"));
    }
    let is_admin = session_is_admin(&session);
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let Some(teams) = g.current_teams.clone() else {
        return HttpResponse::BadRequest().json(error_json(
            badminton_club_web::ClubError::NoTeamsDrawn,
        ));
    };
    match record_match(
        &mut g,
        &teams.team_a,
        &teams.team_b,
        body.score_a,
        body.score_b,
        &body.notes,
        is_admin,
    ) {
        Ok(record) => {
            let snapshot = PersistedState::from_club(&g);
            drop(g);
            persist_and_mirror(&state, snapshot);
            HttpResponse::Ok().json(record)
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// The full ledger, oldest first.
#[get("/api/matches")]
async fn api_match_history(state: AppState) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(&g.match_history)
}

/// Edit a match's scores/winner/notes (admin only; teams are immutable).
#[put("/api/matches/{id}")]
async fn api_edit_match(
    state: AppState,
    session: Session,
    path: Path<MatchPath>,
    body: Json<EditMatchBody>,
) -> HttpResponse {
    let is_admin = session_is_admin(&session);
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match edit_match(
        &mut g,
        path.id,
        body.score_a,
        body.score_b,
        body.winner,
        &body.notes,
        is_admin,
    ) {
        Ok(()) => {
            let snapshot = PersistedState::from_club(&g);
            drop(g);
            persist_and_mirror(&state, snapshot);
            HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Delete matches by id (admin only; all ids validated before any removal).
#[delete("/api/matches")]
async fn api_delete_matches(
    state: AppState,
    session: Session,
    body: Json<DeleteMatchesBody>,
) -> HttpResponse {
    let is_admin = session_is_admin(&session);
    let mut g = match state.club.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match delete_matches(&mut g, &body.ids, is_admin) {
        Ok(()) => {
            let snapshot = PersistedState::from_club(&g);
            drop(g);
            persist_and_mirror(&state, snapshot);
            HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
        }
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

#[get("/api/stats/players")]
async fn api_stats_players(state: AppState) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(player_overview(&g))
}

#[get("/api/stats/teams")]
async fn api_stats_teams(state: AppState) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(team_combinations(&g))
}

#[get("/api/stats/head-to-head")]
async fn api_stats_head_to_head(state: AppState) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(head_to_head(&g))
}

#[get("/api/stats/trends")]
async fn api_stats_trends(state: AppState) -> HttpResponse {
    let g = match state.club.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(player_trends(&g))
}

/// Free-text question about the club data, answered by the hosted model.
/// Failures never touch club state; they come back as error messages.
#[post("/api/ask")]
async fn api_ask(state: AppState, body: Json<AskBody>) -> HttpResponse {
    let Some(adapter) = state.llm.clone() else {
        return HttpResponse::ServiceUnavailable().json(error_json(llm::LlmError::NotConfigured));
    };
    let snapshot = {
        let g = match state.club.read() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        llm::snapshot_text(&g)
    };
    let recent = match state.storage.recent_qa(llm::CONTEXT_QA_LIMIT) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Could not read Q&A log: {}", e);
            Vec::new()
        }
    };
    match adapter.ask(&snapshot, &body.question, &recent).await {
        Ok(answer) => {
            let entry = QaEntry {
                timestamp: badminton_club_web::models::ist_timestamp(),
                question: body.question.clone(),
                answer: answer.clone(),
            };
            match state.storage.append_qa(entry) {
                Ok(()) => mirror_secondary(&state, QA_LOG_FILE, state.storage.qa_log_path()),
                Err(e) => log::warn!("Could not append to Q&A log: {}", e),
            }
            HttpResponse::Ok().json(serde_json::json!({ "answer": answer }))
        }
        Err(e) => {
            log::warn!("Assistant query failed: {}", e);
            HttpResponse::ServiceUnavailable().json(error_json(e))
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let storage = Storage::from_env();
    let mut club = match storage.load() {
        Ok(Some(persisted)) => persisted.into_club(),
        Ok(None) => {
            log::info!("No data file found; starting with the default roster");
            let club = Club::new();
            if let Err(e) = storage.save(&PersistedState::from_club(&club)) {
                log::error!("Could not write initial data file: {}", e);
            }
            club
        }
        Err(e) => {
            log::error!("Could not load data file ({}); starting fresh", e);
            Club::new()
        }
    };

    // ADMIN_PASSWORD overrides whatever digest the data file carries.
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        if !password.is_empty() {
            club.admin_password_hash = auth::hash_password(&password);
        }
    }

    let mirror = match Mirror::from_env() {
        Ok(Some(m)) => {
            log::info!("Remote mirror configured");
            Some(m)
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Mirror disabled: {}", e);
            None
        }
    };
    let llm = llm::QueryAdapter::from_env();
    if llm.is_none() {
        log::info!("LLM_API_KEY not set; /api/ask is disabled");
    }

    let state = Data::new(AppCtx {
        club: RwLock::new(club),
        storage,
        mirror,
        llm,
    });

    // Fresh key per start: admin sessions do not survive a restart.
    let session_key = Key::generate();

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .route("/", web::get().to(serve_index))
            .service(api_health)
            .service(favicon)
            .service(api_get_club)
            .service(api_admin_login)
            .service(api_admin_logout)
            .service(api_change_password)
            .service(api_add_player)
            .service(api_clear_temp_players)
            .service(api_draw_teams)
            .service(api_rematch)
            .service(api_record_match)
            .service(api_match_history)
            .service(api_edit_match)
            .service(api_delete_matches)
            .service(api_stats_players)
            .service(api_stats_teams)
            .service(api_stats_head_to_head)
            .service(api_stats_trends)
            .service(api_ask)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

/// Landing page; counts each new cookie session once.
async fn serve_index(state: AppState, session: Session) -> HttpResponse {
    if !matches!(session.get::<bool>(VISITOR_COUNTED_KEY), Ok(Some(true))) {
        match state.storage.increment_visitors() {
            Ok(total) => {
                let _ = session.insert(VISITOR_COUNTED_KEY, true);
                log::info!("Visitor #{}", total);
                mirror_secondary(&state, VISITOR_FILE, state.storage.visitor_path());
            }
            Err(e) => log::warn!("Could not bump visitor counter: {}", e),
        }
    }
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
