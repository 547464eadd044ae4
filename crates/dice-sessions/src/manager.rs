use std::collections::HashMap;
use std::time::Duration;

use dice_core::{Difficulty, Unique, ID};
use dice_rooms::Room;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Participant, Session, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantAction {
    Sit(u8),
    Stand,
    Ready,
    Unready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    Explicit,
    HeartbeatTimeout,
    Kicked,
}

/// Reported to the turn engine when a transition changes who holds the
/// active turn-order seat out from under it.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent {
    ActivePlayerLeft { participant_id: ID<Participant> },
}

/// Opaque credential handed back on join, presented by the client when it
/// opens the room's websocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTicket(pub Uuid);

/// Owns every `Session`/`Participant` behind a dynamic registry so seat
/// count tracks each room's `maxPlayers` instead of a fixed slot count.
pub struct SessionManager {
    sessions: RwLock<HashMap<ID<Session>, Session>>,
    by_room: RwLock<HashMap<ID<Room>, ID<Session>>>,
    participants: RwLock<HashMap<ID<Participant>, Participant>>,
    roster: RwLock<HashMap<ID<Session>, Vec<ID<Participant>>>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            by_room: RwLock::new(HashMap::new()),
            participants: RwLock::new(HashMap::new()),
            roster: RwLock::new(HashMap::new()),
        }
    }

    async fn session_for_room(&self, room_id: ID<Room>) -> ID<Session> {
        if let Some(id) = self.by_room.read().await.get(&room_id) {
            return *id;
        }
        let session = Session::open(room_id);
        let id = session.id();
        self.sessions.write().await.insert(id, session);
        self.by_room.write().await.insert(room_id, id);
        id
    }

    pub async fn join(
        &self,
        room_id: ID<Room>,
        player_id: Uuid,
        display_name: String,
    ) -> (Session, Participant, StreamTicket) {
        let session_id = self.session_for_room(room_id).await;
        let participant = Participant::join(session_id, player_id, display_name);
        self.register(session_id, participant.clone()).await;
        let session = self.sessions.read().await[&session_id].clone();
        (session, participant, StreamTicket(Uuid::new_v4()))
    }

    pub async fn join_bot(
        &self,
        room_id: ID<Room>,
        display_name: String,
        difficulty: Difficulty,
    ) -> (Session, Participant) {
        let session_id = self.session_for_room(room_id).await;
        let participant = Participant::join_bot(session_id, display_name, difficulty);
        self.register(session_id, participant.clone()).await;
        let session = self.sessions.read().await[&session_id].clone();
        (session, participant)
    }

    async fn register(&self, session_id: ID<Session>, participant: Participant) {
        let id = participant.id();
        self.participants.write().await.insert(id, participant);
        self.roster.write().await.entry(session_id).or_default().push(id);
    }

    pub async fn heartbeat(&self, participant_id: ID<Participant>) -> Result<(), SessionError> {
        let mut participants = self.participants.write().await;
        let p = participants
            .get_mut(&participant_id)
            .ok_or(SessionError::ParticipantNotFound(participant_id))?;
        p.heartbeat();
        Ok(())
    }

    /// A new stream connection presented a refreshed auth token; treated as
    /// liveness too, folding reconnect into the same heartbeat bookkeeping.
    pub async fn refresh_auth(&self, participant_id: ID<Participant>, connection_id: Uuid) -> Result<(), SessionError> {
        let mut participants = self.participants.write().await;
        let p = participants
            .get_mut(&participant_id)
            .ok_or(SessionError::ParticipantNotFound(participant_id))?;
        p.set_connection(Some(connection_id));
        p.heartbeat();
        Ok(())
    }

    pub async fn leave(
        &self,
        participant_id: ID<Participant>,
        _reason: LeaveReason,
    ) -> Result<Option<SessionEvent>, SessionError> {
        let mut participants = self.participants.write().await;
        let p = participants
            .remove(&participant_id)
            .ok_or(SessionError::ParticipantNotFound(participant_id))?;
        drop(participants);
        let mut roster = self.roster.write().await;
        if let Some(seats) = roster.get_mut(&p.session_id()) {
            seats.retain(|id| *id != participant_id);
        }
        log::info!("[sessions] participant {participant_id} left session {}", p.session_id());
        Ok(p.is_turn_order_member().then_some(SessionEvent::ActivePlayerLeft { participant_id }))
    }

    pub async fn update_participant_state(
        &self,
        participant_id: ID<Participant>,
        action: ParticipantAction,
        max_players: u8,
    ) -> Result<Option<SessionEvent>, SessionError> {
        let mut participants = self.participants.write().await;
        let was_turn_member;
        let session_id;
        {
            let p = participants
                .get(&participant_id)
                .ok_or(SessionError::ParticipantNotFound(participant_id))?;
            was_turn_member = p.is_turn_order_member();
            session_id = p.session_id();
        }
        if let ParticipantAction::Sit(seat) = action {
            if seat >= max_players {
                return Err(SessionError::SeatOutOfRange(seat));
            }
            let taken = participants
                .values()
                .any(|other| other.session_id() == session_id && other.seat_index() == Some(seat) && other.id() != participant_id);
            if taken {
                return Err(SessionError::SeatTaken(seat));
            }
        }
        let p = participants.get_mut(&participant_id).expect("checked above");
        match action {
            ParticipantAction::Sit(seat) => p.sit(seat),
            ParticipantAction::Stand => p.stand(),
            ParticipantAction::Ready => p.set_ready(true),
            ParticipantAction::Unready => p.set_ready(false),
        }
        let is_turn_member_now = p.is_turn_order_member();
        drop(participants);
        Ok((was_turn_member && !is_turn_member_now).then_some(SessionEvent::ActivePlayerLeft { participant_id }))
    }

    pub async fn turn_order_members(&self, session_id: ID<Session>) -> Vec<Participant> {
        let roster = self.roster.read().await;
        let participants = self.participants.read().await;
        roster
            .get(&session_id)
            .into_iter()
            .flatten()
            .filter_map(|id| participants.get(id))
            .filter(|p| p.is_turn_order_member())
            .cloned()
            .collect()
    }

    pub async fn participants_of(&self, session_id: ID<Session>) -> Vec<Participant> {
        let roster = self.roster.read().await;
        let participants = self.participants.read().await;
        roster
            .get(&session_id)
            .into_iter()
            .flatten()
            .filter_map(|id| participants.get(id))
            .cloned()
            .collect()
    }

    pub async fn get_participant(&self, participant_id: ID<Participant>) -> Result<Participant, SessionError> {
        self.participants
            .read()
            .await
            .get(&participant_id)
            .cloned()
            .ok_or(SessionError::ParticipantNotFound(participant_id))
    }

    /// Auto-restart hook after a completed round: every seated+ready human
    /// or bot becomes eligible again without needing to re-join.
    pub async fn queue_next(&self, session_id: ID<Session>) -> Vec<Participant> {
        self.turn_order_members(session_id).await
    }

    /// Background-ticker liveness prune: removes participants whose
    /// heartbeat age exceeds `threshold`, emitting `ActivePlayerLeft` for
    /// any that were turn-order members.
    pub async fn prune_stale(&self, threshold: Duration) -> Vec<SessionEvent> {
        let stale_ids: Vec<ID<Participant>> = self
            .participants
            .read()
            .await
            .values()
            .filter(|p| p.is_stale(threshold))
            .map(|p| p.id())
            .collect();
        let mut events = Vec::new();
        for id in stale_ids {
            if let Ok(Some(event)) = self.leave(id, LeaveReason::HeartbeatTimeout).await {
                events.push(event);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_creates_one_session_per_room() {
        let mgr = SessionManager::new();
        let room = ID::default();
        let (s1, _, _) = mgr.join(room, Uuid::new_v4(), "A".into()).await;
        let (s2, _, _) = mgr.join(room, Uuid::new_v4(), "B".into()).await;
        assert_eq!(s1.id(), s2.id());
    }

    #[tokio::test]
    async fn sitting_in_taken_seat_fails() {
        let mgr = SessionManager::new();
        let room = ID::default();
        let (_, p1, _) = mgr.join(room, Uuid::new_v4(), "A".into()).await;
        let (_, p2, _) = mgr.join(room, Uuid::new_v4(), "B".into()).await;
        mgr.update_participant_state(p1.id(), ParticipantAction::Sit(0), 4).await.unwrap();
        let result = mgr.update_participant_state(p2.id(), ParticipantAction::Sit(0), 4).await;
        assert!(matches!(result, Err(SessionError::SeatTaken(0))));
    }

    #[tokio::test]
    async fn leave_while_active_reports_event() {
        let mgr = SessionManager::new();
        let room = ID::default();
        let (_, p, _) = mgr.join(room, Uuid::new_v4(), "A".into()).await;
        mgr.update_participant_state(p.id(), ParticipantAction::Sit(0), 4).await.unwrap();
        mgr.update_participant_state(p.id(), ParticipantAction::Ready, 4).await.unwrap();
        let event = mgr.leave(p.id(), LeaveReason::Explicit).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::ActivePlayerLeft { .. })));
    }

    #[tokio::test]
    async fn standing_down_while_active_reports_event() {
        let mgr = SessionManager::new();
        let room = ID::default();
        let (_, p, _) = mgr.join(room, Uuid::new_v4(), "A".into()).await;
        mgr.update_participant_state(p.id(), ParticipantAction::Sit(0), 4).await.unwrap();
        mgr.update_participant_state(p.id(), ParticipantAction::Ready, 4).await.unwrap();
        let event = mgr.update_participant_state(p.id(), ParticipantAction::Stand, 4).await.unwrap();
        assert!(matches!(event, Some(SessionEvent::ActivePlayerLeft { .. })));
    }

    #[tokio::test]
    async fn prune_stale_removes_quiet_participants() {
        let mgr = SessionManager::new();
        let room = ID::default();
        let (_, p, _) = mgr.join(room, Uuid::new_v4(), "A".into()).await;
        let events = mgr.prune_stale(Duration::from_secs(0)).await;
        assert!(events.is_empty());
        assert!(matches!(
            mgr.get_participant(p.id()).await,
            Err(SessionError::ParticipantNotFound(_))
        ));
    }
}
