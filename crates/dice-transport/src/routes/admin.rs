use actix_web::{web, HttpResponse};
use dice_auth::{AdminAuth, Identity, Role};
use dice_core::{Difficulty, ID};
use dice_rooms::{Paging, RoomFilter};
use dice_sessions::Participant;
use dice_store::Store;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::room_view;
use crate::{ApiError, AppState};

/// Best-effort actor id for the audit trail. Token-mode admin access has
/// no member claim to attribute the mutation to; the caller's resolved
/// `Identity` (federated or anonymous-lurker-cast-to-member) is used
/// either way, since `AuditRecord.actor_id` is a free-form string and
/// token-authenticated tooling has no better identity to offer.
fn actor_of(identity: &Identity) -> ID<dice_auth::Member> {
    identity.user().player_id()
}

pub async fn overview<S: Store>(state: web::Data<AppState<S>>, _admin: AdminAuth) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.admin.overview().await?))
}

pub async fn metrics<S: Store>(state: web::Data<AppState<S>>, _admin: AdminAuth) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.admin.metrics().snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct AdminRoomsQuery {
    difficulty: Option<Difficulty>,
    #[serde(rename = "minPlayers")]
    min_players: Option<u8>,
    q: Option<String>,
    #[serde(default)]
    cursor: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn list_rooms<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<AdminRoomsQuery>,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filter = RoomFilter {
        difficulty: query.difficulty,
        min_players: query.min_players,
        query: query.q,
    };
    let paging = Paging {
        cursor: query.cursor.unwrap_or(0),
        limit: query.limit.unwrap_or(0),
    };
    let page = state.admin.list_rooms(&filter, paging).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": page.items.iter().map(room_view).collect::<Vec<_>>(),
        "nextCursor": page.next_cursor,
    })))
}

pub async fn storage<S: Store>(state: web::Data<AppState<S>>, _admin: AdminAuth) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.admin.storage_info().await?))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    cursor: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn audit<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<AuditQuery>,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = state.admin.audit(query.cursor.as_deref(), query.limit.unwrap_or(50)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": page.items,
        "nextCursor": page.next_cursor,
    })))
}

pub async fn roles<S: Store>(state: web::Data<AppState<S>>, _admin: AdminAuth) -> Result<HttpResponse, ApiError> {
    let roles = state.admin.roles_list().await?;
    Ok(HttpResponse::Ok().json(
        roles
            .into_iter()
            .map(|(id, roles)| serde_json::json!({ "memberId": id, "roles": roles }))
            .collect::<Vec<_>>(),
    ))
}

pub async fn expire_room<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    identity: Identity,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let room_id = ID::from(path.into_inner());
    state.admin.expire_room(actor_of(&identity), room_id).await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct RemoveParticipantBody {
    #[serde(default)]
    reason: Option<String>,
}

pub async fn remove_participant<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<RemoveParticipantBody>,
    identity: Identity,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let participant_id: ID<Participant> = ID::from(path.into_inner());
    state.admin.remove_participant(actor_of(&identity), participant_id, body.into_inner().reason).await?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleBody {
    role: String,
}

pub async fn assign_role<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<AssignRoleBody>,
    identity: Identity,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let member = ID::from(path.into_inner());
    let role = Role::parse(&body.role).ok_or_else(|| ApiError::BadRequest(format!("unknown role '{}'", body.role)))?;
    let roles = state.admin.assign_role(actor_of(&identity), member, role).await?;
    Ok(HttpResponse::Ok().json(roles))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ModerationTermsBody {
    Add { term: String },
    Remove { term: String },
}

pub async fn moderation_terms<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<ModerationTermsBody>,
    identity: Identity,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let actor = actor_of(&identity);
    match body.into_inner() {
        ModerationTermsBody::Add { term } => state.admin.add_term(actor, term).await?,
        ModerationTermsBody::Remove { term } => state.admin.remove_term(actor, &term).await?,
    }
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct ModerationClearBody {
    player: Uuid,
}

pub async fn moderation_clear<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<ModerationClearBody>,
    identity: Identity,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    state.admin.clear_conduct(actor_of(&identity), body.player).await?;
    Ok(HttpResponse::Ok().finish())
}
