use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use dice_auth::{AdminAuth, Identity};
use dice_core::{Unique, ID};
use dice_rooms::Room;
use dice_sessions::{LeaveReason, ParticipantAction};
use dice_store::Store;
use dice_stream::{EventKind, StreamEvent};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::room_view;
use crate::{ApiError, AppState};

/// Recomputes `Room.seatedHumans` from the session roster after any
/// mutation that can change who's seated (join/participant-state/leave/
/// moderate), keeping `Room::is_full`/admin room listings consistent with
/// what `dice-sessions` actually has seated.
pub(crate) async fn sync_room_occupancy<S: Store>(state: &AppState<S>, room_id: ID<Room>, session_id: ID<dice_sessions::Session>) {
    let seated = state
        .sessions
        .participants_of(session_id)
        .await
        .iter()
        .filter(|p| p.is_seated() && !p.is_bot())
        .count() as u8;
    let _ = state.rooms.set_seated_humans(room_id, seated).await;
}

pub async fn join_session<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let room = state.rooms.get(room_id).await?;
    if room.is_closed() {
        return Err(ApiError::RoomClosed);
    }
    let caller = identity.user().player_id().inner();
    if room.is_banned(caller) {
        return Err(ApiError::RoomBanned);
    }
    if room.is_full() {
        return Err(ApiError::RoomFull);
    }
    let display_name = identity.user().display_name().unwrap_or("Lurker").to_string();
    let (session, participant, ticket) = state.sessions.join(room_id, caller, display_name).await;
    state.cache_session(room_id, session.clone()).await;
    sync_room_occupancy(&state, room_id, session.id()).await;
    state
        .stream
        .publish(
            room_id,
            StreamEvent::new(
                EventKind::ParticipantJoined,
                serde_json::json!({ "participantId": participant.id(), "displayName": participant.display_name() }),
            ),
        )
        .await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "sessionId": session.id(),
        "participantId": participant.id(),
        "streamTicket": ticket.0,
        "room": room_view(&room),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ParticipantScoped {
    participant_id: Uuid,
}

pub async fn heartbeat<S: Store>(
    state: web::Data<AppState<S>>,
    _path: web::Path<Uuid>,
    body: web::Json<ParticipantScoped>,
) -> Result<HttpResponse, ApiError> {
    let participant_id = ID::from(body.participant_id);
    state.sessions.heartbeat(participant_id).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn refresh<S: Store>(
    state: web::Data<AppState<S>>,
    _path: web::Path<Uuid>,
    body: web::Json<ParticipantScoped>,
) -> Result<HttpResponse, ApiError> {
    let participant_id = ID::from(body.participant_id);
    let connection_id = Uuid::new_v4();
    state.sessions.refresh_auth(participant_id, connection_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "connectionId": connection_id })))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ParticipantActionBody {
    Sit { seat: u8 },
    Stand,
    Ready,
    Unready,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantStateBody {
    participant_id: Uuid,
    #[serde(flatten)]
    action: ParticipantActionBody,
}

pub async fn participant_state<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<ParticipantStateBody>,
) -> Result<HttpResponse, ApiError> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let room = state.rooms.get(room_id).await?;
    let body = body.into_inner();
    let participant_id = ID::from(body.participant_id);
    let action = match body.action {
        ParticipantActionBody::Sit { seat } => ParticipantAction::Sit(seat),
        ParticipantActionBody::Stand => ParticipantAction::Stand,
        ParticipantActionBody::Ready => ParticipantAction::Ready,
        ParticipantActionBody::Unready => ParticipantAction::Unready,
    };
    let event = state
        .sessions
        .update_participant_state(participant_id, action, room.max_players())
        .await?;
    let Some(session) = state.cached_session_for_room(room_id).await else {
        return Err(ApiError::NotFound(format!("session for room {room_id}")));
    };
    sync_room_occupancy(&state, room_id, session.id()).await;
    if let Some(dice_sessions::SessionEvent::ActivePlayerLeft { participant_id }) = event {
        let owner = state.owner_for(&session, &room).await;
        let events = owner.active_player_left(participant_id, SystemTime::now()).await;
        state.broadcast_turn_events(room_id, events).await;
    }
    state.recompute_turn_order(&session, &room).await;
    let participant = state.sessions.get_participant(participant_id).await?;
    state
        .stream
        .publish(
            room_id,
            StreamEvent::new(
                EventKind::ParticipantState,
                serde_json::json!({
                    "participantId": participant.id(),
                    "isSeated": participant.is_seated(),
                    "isReady": participant.is_ready(),
                    "seatIndex": participant.seat_index(),
                }),
            ),
        )
        .await;
    Ok(HttpResponse::Ok().finish())
}

pub async fn leave<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<ParticipantScoped>,
) -> Result<HttpResponse, ApiError> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let participant_id = ID::from(body.participant_id);
    let event = state.sessions.leave(participant_id, LeaveReason::Explicit).await?;
    if let Some(session) = state.cached_session_for_room(room_id).await {
        sync_room_occupancy(&state, room_id, session.id()).await;
        if let (Some(dice_sessions::SessionEvent::ActivePlayerLeft { participant_id }), Ok(room)) =
            (event, state.rooms.get(room_id).await)
        {
            let owner = state.owner_for(&session, &room).await;
            let events = owner.active_player_left(participant_id, SystemTime::now()).await;
            state.broadcast_turn_events(room_id, events).await;
            state.recompute_turn_order(&session, &room).await;
        }
    }
    Ok(HttpResponse::Ok().finish())
}

pub async fn queue_next<S: Store>(state: web::Data<AppState<S>>, path: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let room = state.rooms.get(room_id).await?;
    let Some(session) = state.cached_session_for_room(room_id).await else {
        return Err(ApiError::NotFound(format!("session for room {room_id}")));
    };
    let order: Vec<_> = state
        .sessions
        .queue_next(session.id())
        .await
        .into_iter()
        .map(|p| p.id())
        .collect();
    let owner = state.owner_for(&session, &room).await;
    let events = owner.queue_next(order, SystemTime::now()).await;
    state.broadcast_turn_events(room_id, events).await;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ModerateAction {
    Kick,
    Ban,
}

#[derive(Debug, Deserialize)]
pub struct ModerateBody {
    action: ModerateAction,
    target_id: Uuid,
    #[serde(default)]
    reason: Option<String>,
}

pub async fn moderate<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<ModerateBody>,
    _admin: AdminAuth,
) -> Result<HttpResponse, ApiError> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let body = body.into_inner();
    let participant_id = ID::from(body.target_id);
    let participant = state.sessions.get_participant(participant_id).await?;
    let player_id = participant.player_id();
    state.sessions.leave(participant_id, LeaveReason::Kicked).await?;
    if matches!(body.action, ModerateAction::Ban) {
        state.rooms.ban(room_id, player_id).await?;
    }
    if let Some(session) = state.cached_session_for_room(room_id).await {
        sync_room_occupancy(&state, room_id, session.id()).await;
    }
    state
        .stream
        .publish(
            room_id,
            StreamEvent::new(
                EventKind::ModerationEvent,
                serde_json::json!({
                    "action": match body.action { ModerateAction::Kick => "kick", ModerateAction::Ban => "ban" },
                    "targetId": body.target_id,
                    "reason": body.reason,
                }),
            ),
        )
        .await;
    Ok(HttpResponse::Ok().finish())
}
