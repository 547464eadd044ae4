//! Background loops that keep state moving without a client request
//! driving it: heartbeat pruning, turn timeouts, bot think/act, room
//! expiry, and audit retention. Each runs as an independent sweep over
//! `AppState`'s registries rather than a single long-lived per-room task.
use std::sync::Arc;
use std::time::SystemTime;

use dice_core::{interrupted, Unique};
use dice_sessions::SessionEvent;
use dice_store::Store;
use dice_stream::{EventKind, StreamEvent};

use crate::routes::sessions::sync_room_occupancy;
use crate::AppState;

async fn tick_every(period: std::time::Duration) -> bool {
    tokio::time::sleep(period).await;
    !interrupted()
}

/// Prunes participants whose heartbeat has gone stale, tearing down the
/// engine's active turn if the departed participant held it.
pub async fn run_heartbeat_ticker<S: Store + 'static>(state: Arc<AppState<S>>) {
    let threshold = state.config.heartbeat_timeout;
    while tick_every(state.config.heartbeat_interval).await {
        for room in state.rooms.all_rooms().await {
            let Some(session) = state.cached_session_for_room(room.id()).await else { continue };
            let now = SystemTime::now();
            let stale: Vec<_> = state
                .sessions
                .participants_of(session.id())
                .await
                .into_iter()
                .filter(|p| now.duration_since(p.last_heartbeat_at()).unwrap_or_default() >= threshold)
                .map(|p| p.id())
                .collect();
            for participant_id in stale {
                let Ok(event) = state.sessions.leave(participant_id, dice_sessions::LeaveReason::HeartbeatTimeout).await else { continue };
                if let Some(SessionEvent::ActivePlayerLeft { participant_id }) = event {
                    let owner = state.owner_for(&session, &room).await;
                    let events = owner.active_player_left(participant_id, now).await;
                    state.broadcast_turn_events(room.id(), events).await;
                }
                sync_room_occupancy(&state, room.id(), session.id()).await;
                state.recompute_turn_order(&session, &room).await;
            }
        }
    }
}

/// Sweeps every live engine for an expired turn deadline and applies the
/// auto-advance the FSM already knows how to do. `preRoll` rolls on behalf
/// of a bot's active turn but only skips a human, so the active
/// participant's bot flag is looked up before the timeout is applied.
pub async fn run_turn_watchdog_ticker<S: Store + 'static>(state: Arc<AppState<S>>) {
    while tick_every(state.config.turn_watchdog_interval).await {
        for room in state.rooms.all_rooms().await {
            let Some(session) = state.cached_session_for_room(room.id()).await else { continue };
            let owner = state.owner_for(&session, &room).await;
            let now = SystemTime::now();
            let snapshot = owner.snapshot();
            if !snapshot.turn_deadline_at.is_some_and(|deadline| now >= deadline) {
                continue;
            }
            let is_bot = match snapshot.active_player_id {
                Some(active) => state.sessions.get_participant(active).await.map(|p| p.is_bot()).unwrap_or(false),
                None => continue,
            };
            let events = owner.timeout(is_bot, now).await;
            state.broadcast_turn_events(room.id(), events).await;
        }
    }
}

/// Acts on behalf of every seated bot whose turn has come up: rolls
/// immediately, then scores after `dice_bots::think_time` has elapsed
/// since the roll landed.
pub async fn run_bot_think_ticker<S: Store + 'static>(state: Arc<AppState<S>>) {
    while tick_every(state.config.bot_think_interval).await {
        for room in state.rooms.all_rooms().await {
            let Some(session) = state.cached_session_for_room(room.id()).await else { continue };
            let owner = state.owner_for(&session, &room).await;
            let now = SystemTime::now();
            let snapshot = owner.snapshot();
            let Some(active) = snapshot.active_player_id else { continue };
            let Ok(participant) = state.sessions.get_participant(active).await else { continue };
            if !participant.is_bot() {
                continue;
            }
            let difficulty = participant.difficulty().unwrap_or(room.difficulty());
            if snapshot.phase != dice_turn::Phase::PreRoll && snapshot.phase != dice_turn::Phase::PostRoll {
                continue;
            }
            if let Some(roll) = &snapshot.active_roll {
                if now.duration_since(roll.rolled_at).unwrap_or_default() < dice_bots::think_time(difficulty) {
                    continue;
                }
            }
            let dice = snapshot.active_roll.as_ref().map(|r| r.dice.as_slice()).unwrap_or(&[]);
            let mut rng = dice_rng::Prng::for_roll(&format!("{}-bot", room.bot_seed()), snapshot.active_player_rolls_taken);
            let action = dice_bots::decide(dice, snapshot.active_roll.is_some(), difficulty, &mut rng);
            let events = match action {
                dice_bots::BotAction::Roll => owner.roll_intent(active, now).await.unwrap_or_default(),
                dice_bots::BotAction::Score(selection) => match &snapshot.active_roll {
                    Some(roll) => owner.score_selection(active, roll.server_roll_id, selection, now).await.unwrap_or_default(),
                    None => continue,
                },
                dice_bots::BotAction::Pass => Vec::new(),
            };
            state.broadcast_turn_events(room.id(), events).await;
        }
    }
}

/// Closes rooms nobody has touched in a while and tops the public lobby
/// back up to its standing room count.
pub async fn run_room_inactivity_ticker<S: Store + 'static>(state: Arc<AppState<S>>) {
    while tick_every(state.config.room_inactivity_timeout / 4).await {
        let expired = state.rooms.expire_inactive(state.config.room_inactivity_timeout).await;
        for room_id in expired {
            state
                .stream
                .publish(room_id, StreamEvent::new(EventKind::RoomClosed, serde_json::json!({ "reason": "inactivity" })))
                .await;
            if let Some(session) = state.cached_session_for_room(room_id).await {
                state.drop_room_owner(session.id()).await;
            }
            state.stream.close_room(room_id).await;
            state.drop_cached_session(room_id).await;
        }
        state.rooms.ensure_public_rooms().await;
    }
}

/// Evicts audit records older than the configured retention window.
pub async fn run_audit_retention_ticker<S: Store + 'static>(state: Arc<AppState<S>>, audit: Arc<dice_audit::AuditLog<S>>) {
    while tick_every(state.config.audit_retention / 24).await {
        match audit.truncate_expired(SystemTime::now()).await {
            Ok(removed) if removed > 0 => log::info!("[audit] retention sweep removed {removed} expired record(s)"),
            Ok(_) => {}
            Err(e) => log::warn!("[audit] retention sweep failed: {e}"),
        }
    }
}
