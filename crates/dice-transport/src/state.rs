use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use dice_admin::AdminService;
use dice_auth::{IdentityService, Member};
use dice_core::{Config, Unique, ID};
use dice_leaderboard::LeaderboardService;
use dice_moderation::ModerationService;
use dice_rooms::{Room, RoomRegistry};
use dice_sessions::{Session, SessionManager};
use dice_stream::{EventKind, StreamEvent, StreamHub};
use dice_turn::{TurnEngine, TurnEvent};
use tokio::sync::RwLock;

use crate::room_owner::RoomHandle;

/// Everything a handler needs, shared behind `web::Data`. One room owner
/// task per session is the sole mutator of its `TurnEngine`; handlers and
/// tickers only ever hold a cheap `RoomHandle` clone to it.
pub struct AppState<S> {
    pub config: Config,
    pub identity: Arc<IdentityService>,
    pub rooms: Arc<RoomRegistry>,
    pub sessions: Arc<SessionManager>,
    pub stream: Arc<StreamHub>,
    pub moderation: Arc<ModerationService<Member>>,
    pub leaderboard: Arc<LeaderboardService<S>>,
    pub admin: Arc<AdminService<S>>,
    room_owners: RwLock<HashMap<ID<Session>, RoomHandle>>,
    // `SessionManager` never exposes a session-by-id lookup (only
    // room-scoped join/create), so the transport layer keeps its own
    // room->session cache, populated at join time, to resolve the session
    // behind every `/sessions/:roomId/*` route.
    room_sessions: RwLock<HashMap<ID<Room>, Session>>,
}

impl<S> AppState<S> {
    pub fn new(
        config: Config,
        identity: Arc<IdentityService>,
        rooms: Arc<RoomRegistry>,
        sessions: Arc<SessionManager>,
        stream: Arc<StreamHub>,
        moderation: Arc<ModerationService<Member>>,
        leaderboard: Arc<LeaderboardService<S>>,
        admin: Arc<AdminService<S>>,
    ) -> Self {
        Self {
            config,
            identity,
            rooms,
            sessions,
            stream,
            moderation,
            leaderboard,
            admin,
            room_owners: RwLock::new(HashMap::new()),
            room_sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cache_session(&self, room_id: ID<Room>, session: Session) {
        self.room_sessions.write().await.insert(room_id, session);
    }

    pub async fn cached_session_for_room(&self, room_id: ID<Room>) -> Option<Session> {
        self.room_sessions.read().await.get(&room_id).cloned()
    }

    pub async fn drop_cached_session(&self, room_id: ID<Room>) {
        self.room_sessions.write().await.remove(&room_id);
    }

    /// Returns the owner task for `session`, spawning one on first use.
    /// Every mutation against the session's `TurnEngine` goes through the
    /// returned handle's command channel; nothing outside `room_owner`
    /// ever touches a `TurnEngine` directly.
    pub async fn owner_for(&self, session: &Session, room: &Room) -> RoomHandle {
        if let Some(owner) = self.room_owners.read().await.get(&session.id()).cloned() {
            return owner;
        }
        let mut owners = self.room_owners.write().await;
        if let Some(owner) = owners.get(&session.id()) {
            return owner.clone();
        }
        let engine = TurnEngine::new(
            session.id(),
            room.bot_seed().to_string(),
            room.difficulty(),
            room.turn_mode(),
            // Open-ended play: the match never hits a hard round cap on its
            // own, only queue-next resets; a very large target keeps the
            // FSM's "matchComplete at target_rounds" guard effectively off.
            u32::MAX,
        );
        let owner = RoomHandle::spawn(engine);
        owners.insert(session.id(), owner.clone());
        owner
    }

    pub async fn drop_room_owner(&self, session_id: ID<Session>) {
        self.room_owners.write().await.remove(&session_id);
    }

    /// Recomputes turn-order membership on the engine after any session
    /// mutation (join/leave/sit/stand/ready) and broadcasts whatever
    /// `TurnEvent`s fall out of it (usually a fresh `TurnStart`).
    pub async fn recompute_turn_order(&self, session: &Session, room: &Room) {
        let order: Vec<_> = self
            .sessions
            .turn_order_members(session.id())
            .await
            .into_iter()
            .map(|p| p.id())
            .collect();
        let owner = self.owner_for(session, room).await;
        let events = owner.set_turn_order(order, SystemTime::now()).await;
        self.broadcast_turn_events(room.id(), events).await;
    }

    pub async fn broadcast_turn_events(&self, room_id: ID<Room>, events: Vec<TurnEvent>) {
        for event in events {
            let (kind, payload) = match &event {
                TurnEvent::TurnStart { round_index, participant_id } => (
                    EventKind::TurnStart,
                    serde_json::json!({ "roundIndex": round_index, "participantId": participant_id }),
                ),
                TurnEvent::RollResult { server_roll_id, roll_index, dice } => (
                    EventKind::RollResult,
                    serde_json::json!({ "serverRollId": server_roll_id, "rollIndex": roll_index, "dice": dice }),
                ),
                TurnEvent::ScoreCommitted { participant_id, roll_index, dice_selection, points } => (
                    EventKind::ScoreCommitted,
                    serde_json::json!({
                        "participantId": participant_id,
                        "rollIndex": roll_index,
                        "selection": dice_selection,
                        "points": points,
                    }),
                ),
                TurnEvent::TurnEnd { participant_id, pool_exhausted } => (
                    EventKind::TurnEnd,
                    serde_json::json!({ "participantId": participant_id, "poolExhausted": pool_exhausted }),
                ),
                TurnEvent::TimeoutAutoAdvance { participant_id, phase } => (
                    EventKind::TurnEnd,
                    serde_json::json!({ "participantId": participant_id, "phase": phase, "auto": true }),
                ),
                TurnEvent::MatchComplete { scores } => (
                    EventKind::SystemNotification,
                    serde_json::json!({ "matchComplete": true, "scores": scores }),
                ),
            };
            self.stream.publish(room_id, StreamEvent::new(kind, payload)).await;
        }
    }
}
