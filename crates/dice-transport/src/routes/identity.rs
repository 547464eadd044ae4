use actix_web::{web, HttpResponse, Responder};
use dice_auth::Identity;
use dice_leaderboard::ScoreSubmission;
use dice_store::Store;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiError, AppState};

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_identity<S: Store>(state: web::Data<AppState<S>>, identity: Identity) -> Result<HttpResponse, ApiError> {
    let user = identity.user();
    let player_id = user.player_id().inner();
    let roles: Vec<dice_auth::Role> = match user {
        dice_auth::User::Auth(member) => member.roles().to_vec(),
        dice_auth::User::Anon(_) => Vec::new(),
    };
    // A first sight of this player id is enough to seed a profile; the
    // leaderboard/profile surface is the source of truth from here on.
    let name = user.display_name().unwrap_or("Lurker").to_string();
    state.leaderboard.get_profile_or_create(player_id, &name).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "playerId": player_id,
        "identityKind": if user.is_anonymous() { "anonymous" } else { "federated" },
        "roles": roles,
    })))
}

pub async fn get_profile<S: Store>(state: web::Data<AppState<S>>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let player_id = path.into_inner();
    let profile = state
        .leaderboard
        .get_profile(player_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("profile {player_id}")))?;
    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    settings: Option<serde_json::Value>,
}

pub async fn put_profile<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    identity: Identity,
    body: web::Json<ProfilePatch>,
) -> Result<HttpResponse, ApiError> {
    let player_id = path.into_inner();
    if identity.user().player_id().inner() != player_id {
        return Err(ApiError::Forbidden);
    }
    state.leaderboard.get_profile_or_create(player_id, "Lurker").await?;
    let body = body.into_inner();
    let profile = state.leaderboard.upsert_profile(player_id, body.display_name, body.settings).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Wire shape for a single submitted match result. `ScoreSubmission` itself
/// only derives `Debug, Clone` (it's never round-tripped through the
/// store verbatim — `ScoreEntry` is), so the client-facing batch body is
/// its own DTO, converted per-entry before it reaches the leaderboard.
#[derive(Debug, Deserialize)]
pub struct SubmitScoreBody {
    session_id: Uuid,
    difficulty: dice_core::Difficulty,
    total_score: u32,
    busts: u32,
    rolls_taken: u32,
}

impl From<SubmitScoreBody> for ScoreSubmission {
    fn from(body: SubmitScoreBody) -> Self {
        ScoreSubmission {
            session_id: body.session_id,
            difficulty: body.difficulty,
            total_score: body.total_score,
            busts: body.busts,
            rolls_taken: body.rolls_taken,
        }
    }
}

pub async fn submit_score<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<Vec<SubmitScoreBody>>,
) -> Result<HttpResponse, ApiError> {
    let player_id = path.into_inner();
    let mut entries = Vec::with_capacity(body.len());
    for submission in body.into_inner() {
        let entry = state.leaderboard.submit_score(player_id, submission.into()).await?;
        entries.push(entry);
    }
    Ok(HttpResponse::Ok().json(entries))
}
