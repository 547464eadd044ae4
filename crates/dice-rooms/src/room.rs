use std::time::{Duration, SystemTime};

use dice_core::{Difficulty, RoomStatus, TurnMode, Unique, Visibility, ID};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// A multiplayer lobby: capacity, difficulty, visibility, and lifecycle.
/// Turn state itself lives in `dice-turn`/`dice-sessions`; `Room` only
/// tracks the metadata the registry and the admin/room-list surfaces need.
#[derive(Debug, Clone)]
pub struct Room {
    id: ID<Self>,
    code: String,
    name: String,
    difficulty: Difficulty,
    visibility: Visibility,
    max_players: u8,
    turn_mode: TurnMode,
    created_at: SystemTime,
    last_activity_at: SystemTime,
    status: RoomStatus,
    bot_seed: String,
    seated_humans: u8,
    banned_players: std::collections::HashSet<uuid::Uuid>,
}

pub struct NewRoom {
    pub name: String,
    pub difficulty: Difficulty,
    pub visibility: Visibility,
    pub max_players: u8,
    pub turn_mode: TurnMode,
}

impl Room {
    pub fn new(opts: NewRoom) -> Self {
        let now = SystemTime::now();
        let id = ID::default();
        Self {
            id,
            code: generate_code(),
            name: opts.name,
            difficulty: opts.difficulty,
            visibility: opts.visibility,
            max_players: opts.max_players.clamp(2, 8),
            turn_mode: opts.turn_mode,
            created_at: now,
            last_activity_at: now,
            status: RoomStatus::Lobby,
            bot_seed: id.to_string(),
            seated_humans: 0,
            banned_players: std::collections::HashSet::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
    pub fn max_players(&self) -> u8 {
        self.max_players
    }
    pub fn turn_mode(&self) -> TurnMode {
        self.turn_mode
    }
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
    pub fn last_activity_at(&self) -> SystemTime {
        self.last_activity_at
    }
    pub fn status(&self) -> RoomStatus {
        self.status
    }
    pub fn bot_seed(&self) -> &str {
        &self.bot_seed
    }
    pub fn seated_humans(&self) -> u8 {
        self.seated_humans
    }
    pub fn is_full(&self) -> bool {
        self.seated_humans >= self.max_players
    }
    pub fn is_closed(&self) -> bool {
        matches!(self.status, RoomStatus::Closed)
    }
    pub fn is_banned(&self, player: uuid::Uuid) -> bool {
        self.banned_players.contains(&player)
    }

    pub fn ban(&mut self, player: uuid::Uuid) {
        self.banned_players.insert(player);
    }

    /// Monotonically bumps activity; `lastActivityAt` never decreases.
    pub fn touch(&mut self) {
        let now = SystemTime::now();
        if now > self.last_activity_at {
            self.last_activity_at = now;
        }
    }

    pub fn set_seated_humans(&mut self, n: u8) {
        self.seated_humans = n;
        self.touch();
    }

    pub fn activate(&mut self) {
        if matches!(self.status, RoomStatus::Lobby) {
            self.status = RoomStatus::Active;
        }
    }

    /// Rooms in `closed` never re-open.
    pub fn close(&mut self) {
        self.status = RoomStatus::Closed;
    }

    pub fn inactive_for(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.last_activity_at)
            .unwrap_or_default()
    }
}

impl Unique for Room {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

fn generate_code() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(max_players: u8) -> Room {
        Room::new(NewRoom {
            name: "Test Room".into(),
            difficulty: Difficulty::Easy,
            visibility: Visibility::Public,
            max_players,
            turn_mode: TurnMode::RollByRoll,
        })
    }

    #[test]
    fn max_players_is_clamped_to_valid_range() {
        assert_eq!(room(1).max_players(), 2);
        assert_eq!(room(20).max_players(), 8);
    }

    #[test]
    fn code_has_expected_length() {
        assert_eq!(room(4).code().len(), CODE_LEN);
    }

    #[test]
    fn closing_is_terminal() {
        let mut r = room(4);
        r.close();
        assert!(r.is_closed());
        r.activate();
        assert!(r.is_closed());
    }

    #[test]
    fn touch_never_decreases_last_activity() {
        let mut r = room(4);
        let first = r.last_activity_at();
        std::thread::sleep(Duration::from_millis(5));
        r.touch();
        assert!(r.last_activity_at() >= first);
    }
}
