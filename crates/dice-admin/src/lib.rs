//! Operator-facing reads (`Overview`/`Metrics`/`ListRooms`/`StorageInfo`/
//! `Audit`/`RolesList`) and audited mutations (`ExpireRoom`/
//! `RemoveParticipant`/`AssignRole`/`AddTerm`/`RemoveTerm`/`ClearConduct`).
//! One service over `dice-store`, with every mutation writing an
//! `AuditRecord` through `dice-audit` before it returns.
mod error;
mod metrics;
mod roles;

pub use error::AdminError;
pub use metrics::{Metrics, MetricsSnapshot};

use std::sync::Arc;
use std::time::SystemTime;

use dice_audit::{AuditLog, AuditPage, AuditRecord};
use dice_auth::{Member, Role};
use dice_core::ID;
use dice_moderation::ModerationService;
use dice_rooms::{Page, Paging, Room, RoomFilter, RoomRegistry};
use dice_sessions::{LeaveReason, Participant, SessionManager};
use dice_store::{StorageInfo, Store};
use uuid::Uuid;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Overview {
    pub rooms_active: usize,
    pub metrics: MetricsSnapshot,
    pub storage: StorageInfo,
}

pub struct AdminService<S> {
    store: S,
    rooms: Arc<RoomRegistry>,
    sessions: Arc<SessionManager>,
    moderation: Arc<ModerationService<Member>>,
    audit: Arc<AuditLog<S>>,
    metrics: Arc<Metrics>,
}

impl<S: Store> AdminService<S> {
    pub fn new(
        store: S,
        rooms: Arc<RoomRegistry>,
        sessions: Arc<SessionManager>,
        moderation: Arc<ModerationService<Member>>,
        audit: Arc<AuditLog<S>>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            rooms,
            sessions,
            moderation,
            audit,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn overview(&self) -> Result<Overview, AdminError> {
        let rooms = self.rooms.all_rooms().await;
        let rooms_active = rooms.iter().filter(|r| !r.is_closed()).count();
        let storage = self.store.storage_info().await?;
        Ok(Overview {
            rooms_active,
            metrics: self.metrics.snapshot(),
            storage,
        })
    }

    pub async fn list_rooms(&self, filter: &RoomFilter, paging: Paging) -> Page<Room> {
        self.rooms.list_rooms(filter, paging).await
    }

    pub async fn storage_info(&self) -> Result<StorageInfo, AdminError> {
        Ok(self.store.storage_info().await?)
    }

    pub async fn audit(&self, cursor: Option<&str>, limit: usize) -> Result<AuditPage, AdminError> {
        Ok(self.audit.page(cursor, limit).await?)
    }

    pub async fn roles_list(&self) -> Result<Vec<(ID<Member>, Vec<Role>)>, AdminError> {
        roles::list_all(&self.store).await
    }

    pub async fn expire_room(&self, actor: ID<Member>, room_id: ID<Room>) -> Result<(), AdminError> {
        self.rooms.expire_room(room_id).await?;
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "expire_room".into(),
                subject: room_id.to_string(),
                before: None,
                after: None,
                reason: None,
            })
            .await?;
        Ok(())
    }

    pub async fn remove_participant(
        &self,
        actor: ID<Member>,
        participant_id: ID<Participant>,
        reason: Option<String>,
    ) -> Result<(), AdminError> {
        self.sessions.leave(participant_id, LeaveReason::Kicked).await?;
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "remove_participant".into(),
                subject: participant_id.to_string(),
                before: None,
                after: None,
                reason,
            })
            .await?;
        Ok(())
    }

    pub async fn assign_role(&self, actor: ID<Member>, member: ID<Member>, role: Role) -> Result<Vec<Role>, AdminError> {
        let roles = roles::assign_role(&self.store, member, role).await?;
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "assign_role".into(),
                subject: member.to_string(),
                before: None,
                after: serde_json::to_value(&roles).ok(),
                reason: None,
            })
            .await?;
        Ok(roles)
    }

    pub async fn add_term(&self, actor: ID<Member>, term: String) -> Result<(), AdminError> {
        self.moderation.add_term(term.clone()).await;
        self.metrics.moderation_action();
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "add_term".into(),
                subject: term,
                before: None,
                after: None,
                reason: None,
            })
            .await?;
        Ok(())
    }

    pub async fn remove_term(&self, actor: ID<Member>, term: &str) -> Result<(), AdminError> {
        self.moderation.remove_term(term).await;
        self.metrics.moderation_action();
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "remove_term".into(),
                subject: term.to_string(),
                before: None,
                after: None,
                reason: None,
            })
            .await?;
        Ok(())
    }

    pub async fn clear_conduct(&self, actor: ID<Member>, player: Uuid) -> Result<(), AdminError> {
        let target: ID<Member> = ID::from(player);
        self.moderation.clear_strikes(target).await;
        self.metrics.moderation_action();
        self.audit
            .append(AuditRecord {
                at: SystemTime::now(),
                actor_id: actor.to_string(),
                actor_kind: "operator".into(),
                action: "clear_conduct".into(),
                subject: target.to_string(),
                before: None,
                after: None,
                reason: None,
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_core::{Difficulty, TurnMode, Visibility};
    use dice_moderation::AdaptiveTermSet;
    use dice_store::FileStore;
    use std::time::Duration;

    async fn service(dir: &std::path::Path) -> AdminService<Arc<FileStore>> {
        let store = Arc::new(FileStore::open(dir).unwrap());
        let rooms = Arc::new(RoomRegistry::new());
        let sessions = Arc::new(SessionManager::new());
        let moderation = Arc::new(ModerationService::new(AdaptiveTermSet::new(), 2, 3, Duration::from_secs(60)));
        let audit = Arc::new(AuditLog::new(store.clone(), Duration::from_secs(3600)));
        let metrics = Arc::new(Metrics::new());
        AdminService::new(store, rooms, sessions, moderation, audit, metrics)
    }

    #[tokio::test]
    async fn expiring_a_room_writes_one_audit_record() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;
        let room = svc
            .rooms
            .create_room(dice_rooms::NewRoom {
                name: "table".into(),
                difficulty: Difficulty::Easy,
                visibility: Visibility::Public,
                max_players: 4,
                turn_mode: TurnMode::RollByRoll,
            })
            .await;
        let actor: ID<Member> = ID::default();
        svc.expire_room(actor, room.id()).await.unwrap();
        let page = svc.audit(None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].action, "expire_room");
    }

    #[tokio::test]
    async fn assigning_a_role_is_visible_in_roles_list() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;
        let actor: ID<Member> = ID::default();
        let member: ID<Member> = ID::default();
        svc.assign_role(actor, member, Role::Operator).await.unwrap();
        let roles = svc.roles_list().await.unwrap();
        assert!(roles.iter().any(|(id, r)| *id == member && r.contains(&Role::Operator)));
    }

    #[tokio::test]
    async fn overview_reports_active_room_count() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;
        svc.rooms
            .create_room(dice_rooms::NewRoom {
                name: "table".into(),
                difficulty: Difficulty::Easy,
                visibility: Visibility::Public,
                max_players: 4,
                turn_mode: TurnMode::RollByRoll,
            })
            .await;
        let overview = svc.overview().await.unwrap();
        assert_eq!(overview.rooms_active, 1);
    }
}
