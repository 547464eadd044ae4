use std::time::SystemTime;

use actix_web::{web, Error, HttpRequest, HttpResponse};
use dice_auth::Member;
use dice_core::{Unique, ID};
use dice_moderation::ModerationOutcome;
use dice_rooms::Room;
use dice_rules::Die;
use dice_sessions::{LeaveReason, Participant};
use dice_store::Store;
use dice_stream::{EventKind, StreamEvent};
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::sessions::sync_room_occupancy;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "participantId")]
    participant_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TurnActionKind {
    Roll,
    Score,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    TurnAction {
        action: TurnActionKind,
        #[serde(default)]
        server_roll_id: Option<Uuid>,
        #[serde(default)]
        selection: Vec<Uuid>,
    },
    Chat {
        channel: String,
        body: String,
        #[serde(default)]
        to: Option<Uuid>,
    },
    Heartbeat,
}

fn to_frame(event: &StreamEvent) -> serde_json::Value {
    let mut obj = match &event.payload {
        serde_json::Value::Object(map) => map.clone(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("payload".into(), other.clone());
            map
        }
    };
    obj.insert("type".into(), serde_json::to_value(event.kind).unwrap_or_default());
    serde_json::Value::Object(obj)
}

/// Upgrades to a websocket and bridges the room's `StreamHub` fan-out to
/// this connection via `actix_ws::handle` + `tokio::select!`: a
/// per-subscriber receiver pumps outbound events while inbound frames
/// dispatch into the turn engine, moderation, and session services.
pub async fn stream_room<S: Store + 'static>(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    query: web::Query<StreamQuery>,
) -> Result<HttpResponse, Error> {
    let room_id: ID<Room> = ID::from(path.into_inner());
    let participant_id: ID<Participant> = ID::from(query.participant_id);

    let room = state.rooms.get(room_id).await.map_err(ApiError::from)?;
    let participant = state.sessions.get_participant(participant_id).await.map_err(ApiError::from)?;
    if participant.session_id() != state.cached_session_for_room(room_id).await.map(|s| s.id()).unwrap_or_default() {
        return Err(ApiError::NotFound(format!("participant {participant_id} in room {room_id}")).into());
    }

    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    state.admin.metrics().ws_connection_opened();
    state
        .sessions
        .refresh_auth(participant_id, Uuid::new_v4())
        .await
        .map_err(ApiError::from)?;

    let (handle, mut events) = state.stream.subscribe(room_id).await;
    log::debug!("[stream] participant {participant_id} connected to room {room_id}");

    actix_web::rt::spawn(async move {
        if let Some(snapshot) = build_session_state(&state, room_id).await {
            let frame = to_frame(&StreamEvent::new(EventKind::SessionState, snapshot));
            if session.text(frame.to_string()).await.is_err() {
                state.stream.unsubscribe(handle).await;
                state.admin.metrics().ws_connection_closed();
                return;
            }
        }

        'pump: loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => {
                        let targets_self = matches!(
                            &event.payload,
                            serde_json::Value::Object(map)
                                if event.kind == EventKind::ModerationEvent
                                    && map.get("action").and_then(|v| v.as_str()) == Some("ban")
                                    && map.get("targetId").and_then(|v| v.as_str()) == Some(&participant_id.to_string())
                        );
                        let frame = to_frame(&event);
                        let sent = session.text(frame.to_string()).await.is_ok();
                        if !sent || targets_self {
                            break 'pump;
                        }
                    }
                    None => break 'pump,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        handle_frame(&state, room_id, participant_id, &text).await;
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'pump,
                    Some(Err(_)) | None => break 'pump,
                    _ => continue 'pump,
                },
            }
        }
        state.stream.unsubscribe(handle).await;
        state.admin.metrics().ws_connection_closed();
        log::debug!("[stream] participant {participant_id} disconnected from room {room_id}");
    });

    Ok(response)
}

/// Builds the resync snapshot sent as the first frame of every connection:
/// the room's full turn state plus a roster entry per participant. Absent
/// on a room with no session yet (freshly created, nobody's turn order set).
async fn build_session_state<S: Store>(state: &AppState<S>, room_id: ID<Room>) -> Option<serde_json::Value> {
    let room = state.rooms.get(room_id).await.ok()?;
    let session = state.cached_session_for_room(room_id).await?;
    let owner = state.owner_for(&session, &room).await;
    let snapshot = owner.snapshot();
    let participants: Vec<_> = state
        .sessions
        .participants_of(session.id())
        .await
        .into_iter()
        .map(|p| {
            serde_json::json!({
                "participantId": p.id(),
                "displayName": p.display_name(),
                "isSeated": p.is_seated(),
                "isReady": p.is_ready(),
                "seatIndex": p.seat_index(),
                "isBot": p.is_bot(),
            })
        })
        .collect();
    Some(serde_json::json!({
        "phase": snapshot.phase,
        "roundIndex": snapshot.round_index,
        "activePlayerId": snapshot.active_player_id,
        "turnDeadlineAt": snapshot.turn_deadline_at,
        "scoreboard": snapshot.scoreboard,
        "participants": participants,
    }))
}

async fn handle_frame<S: Store>(state: &AppState<S>, room_id: ID<Room>, participant_id: ID<Participant>, text: &str) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("[stream] room {room_id} dropped an unparsable client frame: {e}");
            return;
        }
    };
    match frame {
        ClientFrame::Heartbeat => {
            let _ = state.sessions.heartbeat(participant_id).await;
        }
        ClientFrame::TurnAction { action, server_roll_id, selection } => {
            handle_turn_action(state, room_id, participant_id, action, server_roll_id, selection).await;
        }
        ClientFrame::Chat { channel, body, to } => {
            handle_chat(state, room_id, participant_id, channel, body, to).await;
        }
    }
}

async fn handle_turn_action<S: Store>(
    state: &AppState<S>,
    room_id: ID<Room>,
    participant_id: ID<Participant>,
    action: TurnActionKind,
    server_roll_id: Option<Uuid>,
    selection: Vec<Uuid>,
) {
    let Ok(room) = state.rooms.get(room_id).await else { return };
    let Some(session) = state.cached_session_for_room(room_id).await else { return };
    let owner = state.owner_for(&session, &room).await;
    let now = SystemTime::now();
    let result = match action {
        TurnActionKind::Roll => owner.roll_intent(participant_id, now).await,
        TurnActionKind::Score => {
            let selection: Vec<ID<Die>> = selection.into_iter().map(ID::from).collect();
            owner.score_selection(participant_id, server_roll_id.unwrap_or_default(), selection, now).await
        }
    };
    match result {
        Ok(events) => state.broadcast_turn_events(room_id, events).await,
        Err(e) => log::info!("[stream] turn action from {participant_id} in room {room_id} rejected: {e}"),
    }
}

async fn handle_chat<S: Store>(state: &AppState<S>, room_id: ID<Room>, participant_id: ID<Participant>, channel: String, body: String, to: Option<Uuid>) {
    let Ok(participant) = state.sessions.get_participant(participant_id).await else { return };
    let sender: ID<Member> = ID::from(participant.player_id());
    if let Some(recipient) = to {
        if let Ok(Some(profile)) = state.leaderboard.get_profile(recipient).await {
            if profile.has_blocked(participant.player_id()) {
                log::debug!("[stream] chat from {participant_id} dropped: recipient has blocked sender");
                return;
            }
        }
    }
    match state.moderation.evaluate(sender, &body, SystemTime::now()).await {
        Ok(ModerationOutcome::Clean) | Ok(ModerationOutcome::Warned { .. }) => {
            state
                .stream
                .publish(
                    room_id,
                    StreamEvent::new(
                        EventKind::ChatMessage,
                        serde_json::json!({
                            "senderId": participant_id,
                            "channel": channel,
                            "body": body,
                            "to": to,
                        }),
                    ),
                )
                .await;
        }
        Ok(outcome @ ModerationOutcome::Muted { .. }) => {
            log::info!("[stream] chat from {participant_id} suppressed: {outcome:?}");
        }
        Ok(ModerationOutcome::Banned { hit }) => {
            log::info!("[stream] chat from {participant_id} crossed the ban threshold on term {:?}", hit.term);
            let _ = state.rooms.ban(room_id, participant.player_id()).await;
            let _ = state.sessions.leave(participant_id, LeaveReason::Kicked).await;
            if let Some(session) = state.cached_session_for_room(room_id).await {
                sync_room_occupancy(state, room_id, session.id()).await;
            }
            state
                .stream
                .publish(
                    room_id,
                    StreamEvent::new(
                        EventKind::ModerationEvent,
                        serde_json::json!({ "action": "ban", "targetId": participant_id, "reason": hit.term }),
                    ),
                )
                .await;
        }
        Err(e) => {
            log::info!("[stream] chat from {participant_id} rejected: {e}");
        }
    }
}
