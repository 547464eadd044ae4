use std::collections::HashMap;

use dice_core::{Difficulty, TurnMode, Unique, Visibility, ID};
use tokio::sync::RwLock;

use crate::{NewRoom, Room, RoomError};

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub difficulty: Option<Difficulty>,
    pub min_players: Option<u8>,
    pub query: Option<String>,
}

impl RoomFilter {
    fn matches(&self, room: &Room) -> bool {
        if let Some(d) = self.difficulty {
            if room.difficulty() != d {
                return false;
            }
        }
        if let Some(min) = self.min_players {
            if room.max_players() < min {
                return false;
            }
        }
        if let Some(q) = &self.query {
            if !room.name().to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Paging {
    pub cursor: usize,
    pub limit: usize,
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<usize>,
}

/// Owns every room's metadata behind a `RwLock<HashMap<ID<Room>, _>>`,
/// exposing the full create/list/join/expire surface.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<ID<Room>, Room>>,
    codes: RwLock<HashMap<String, ID<Room>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            codes: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create_room(&self, opts: NewRoom) -> Room {
        let room = Room::new(opts);
        self.insert(room.clone()).await;
        room
    }

    async fn insert(&self, room: Room) {
        self.codes.write().await.insert(room.code().to_string(), room.id());
        self.rooms.write().await.insert(room.id(), room);
    }

    pub async fn get(&self, id: ID<Room>) -> Result<Room, RoomError> {
        self.rooms.read().await.get(&id).cloned().ok_or(RoomError::NotFound(id))
    }

    pub async fn list_rooms(&self, filter: &RoomFilter, paging: Paging) -> Page<Room> {
        let rooms = self.rooms.read().await;
        let mut matched: Vec<Room> = rooms
            .values()
            .filter(|r| matches!(r.visibility(), Visibility::Public))
            .filter(|r| !r.is_closed())
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.created_at());
        let limit = if paging.limit == 0 { 20 } else { paging.limit };
        let next_cursor = if paging.cursor + limit < matched.len() {
            Some(paging.cursor + limit)
        } else {
            None
        };
        let items = matched
            .into_iter()
            .skip(paging.cursor)
            .take(limit)
            .collect();
        Page { items, next_cursor }
    }

    /// Picks (or auto-seeds) a public room matching `filter` with room for
    /// another seated human.
    pub async fn join_public(&self, filter: &RoomFilter, caller: uuid::Uuid) -> Result<Room, RoomError> {
        {
            let rooms = self.rooms.read().await;
            if let Some(room) = rooms
                .values()
                .filter(|r| matches!(r.visibility(), Visibility::Public))
                .filter(|r| !r.is_closed())
                .filter(|r| !r.is_full())
                .filter(|r| !r.is_banned(caller))
                .filter(|r| filter.matches(r))
                .min_by_key(|r| r.seated_humans())
            {
                return Ok(room.clone());
            }
        }
        let difficulty = filter.difficulty.unwrap_or(Difficulty::Normal);
        let room = self
            .create_room(NewRoom {
                name: format!("{difficulty} table"),
                difficulty,
                visibility: Visibility::Public,
                max_players: 8,
                turn_mode: TurnMode::RollByRoll,
            })
            .await;
        Ok(room)
    }

    pub async fn join_by_code(&self, code: &str, caller: uuid::Uuid) -> Result<Room, RoomError> {
        let id = *self
            .codes
            .read()
            .await
            .get(&code.to_uppercase())
            .ok_or(RoomError::CodeNotFound)?;
        let room = self.get(id).await?;
        if room.is_closed() {
            return Err(RoomError::Closed(id));
        }
        if room.is_banned(caller) {
            return Err(RoomError::Banned(id));
        }
        if room.is_full() {
            return Err(RoomError::Full(id));
        }
        Ok(room)
    }

    pub async fn expire_room(&self, id: ID<Room>) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(&id).ok_or(RoomError::NotFound(id))?;
        room.close();
        Ok(())
    }

    pub async fn update_activity(&self, id: ID<Room>) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(&id).ok_or(RoomError::NotFound(id))?;
        room.touch();
        Ok(())
    }

    pub async fn set_seated_humans(&self, id: ID<Room>, n: u8) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(&id).ok_or(RoomError::NotFound(id))?;
        room.set_seated_humans(n);
        if n > 0 {
            room.activate();
        }
        Ok(())
    }

    pub async fn ban(&self, id: ID<Room>, player: uuid::Uuid) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(&id).ok_or(RoomError::NotFound(id))?;
        room.ban(player);
        Ok(())
    }

    /// Auto-seeds one public room per difficulty so the public list is
    /// never empty; run by the room-inactivity ticker alongside expiry.
    pub async fn ensure_public_rooms(&self) {
        for difficulty in Difficulty::ALL {
            let has_one = {
                let rooms = self.rooms.read().await;
                rooms
                    .values()
                    .any(|r| matches!(r.visibility(), Visibility::Public) && !r.is_closed() && r.difficulty() == difficulty)
            };
            if !has_one {
                let room = self
                    .create_room(NewRoom {
                        name: format!("{difficulty} table"),
                        difficulty,
                        visibility: Visibility::Public,
                        max_players: 8,
                        turn_mode: TurnMode::RollByRoll,
                    })
                    .await;
                log::info!("[rooms] auto-seeded public {difficulty} room {}", room.id());
            }
        }
    }

    /// Closes every room that has had no activity for longer than
    /// `threshold` and currently has no seated humans.
    pub async fn expire_inactive(&self, threshold: std::time::Duration) -> Vec<ID<Room>> {
        let mut rooms = self.rooms.write().await;
        let mut expired = Vec::new();
        for room in rooms.values_mut() {
            if !room.is_closed() && room.seated_humans() == 0 && room.inactive_for() > threshold {
                room.close();
                expired.push(room.id());
                log::info!("[rooms] expired inactive room {}", room.id());
            }
        }
        expired
    }

    pub async fn all_rooms(&self) -> Vec<Room> {
        self.rooms.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(difficulty: Difficulty, visibility: Visibility) -> NewRoom {
        NewRoom {
            name: "room".into(),
            difficulty,
            visibility,
            max_players: 2,
            turn_mode: TurnMode::RollByRoll,
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let registry = RoomRegistry::new();
        let room = registry.create_room(opts(Difficulty::Easy, Visibility::Public)).await;
        assert_eq!(registry.get(room.id()).await.unwrap().id(), room.id());
    }

    #[tokio::test]
    async fn private_rooms_are_not_listed() {
        let registry = RoomRegistry::new();
        registry.create_room(opts(Difficulty::Easy, Visibility::Private)).await;
        let page = registry.list_rooms(&RoomFilter::default(), Paging::default()).await;
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn join_by_code_rejects_unknown_code() {
        let registry = RoomRegistry::new();
        assert!(matches!(
            registry.join_by_code("ZZZZZZ", uuid::Uuid::nil()).await,
            Err(RoomError::CodeNotFound)
        ));
    }

    #[tokio::test]
    async fn join_by_code_finds_the_room() {
        let registry = RoomRegistry::new();
        let room = registry.create_room(opts(Difficulty::Easy, Visibility::Private)).await;
        let found = registry.join_by_code(room.code(), uuid::Uuid::nil()).await.unwrap();
        assert_eq!(found.id(), room.id());
    }

    #[tokio::test]
    async fn join_public_auto_seeds_when_none_exists() {
        let registry = RoomRegistry::new();
        let filter = RoomFilter {
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        let room = registry.join_public(&filter, uuid::Uuid::nil()).await.unwrap();
        assert_eq!(room.difficulty(), Difficulty::Hard);
    }

    #[tokio::test]
    async fn banned_player_cannot_join_by_code() {
        let registry = RoomRegistry::new();
        let room = registry.create_room(opts(Difficulty::Easy, Visibility::Private)).await;
        let player = uuid::Uuid::new_v4();
        registry.ban(room.id(), player).await.unwrap();
        assert!(matches!(
            registry.join_by_code(room.code(), player).await,
            Err(RoomError::Banned(_))
        ));
    }

    #[tokio::test]
    async fn expire_inactive_closes_only_empty_stale_rooms() {
        let registry = RoomRegistry::new();
        let room = registry.create_room(opts(Difficulty::Easy, Visibility::Public)).await;
        let expired = registry.expire_inactive(std::time::Duration::from_secs(0)).await;
        assert_eq!(expired, vec![room.id()]);
        assert!(registry.get(room.id()).await.unwrap().is_closed());
    }

    #[tokio::test]
    async fn ensure_public_rooms_seeds_every_difficulty() {
        let registry = RoomRegistry::new();
        registry.ensure_public_rooms().await;
        let page = registry.list_rooms(&RoomFilter::default(), Paging::default()).await;
        assert_eq!(page.items.len(), 3);
    }
}
