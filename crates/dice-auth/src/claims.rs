use dice_core::ID;

use crate::{Member, Role};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: uuid::Uuid,
    pub usr: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(player: ID<Member>, display_name: String, roles: Vec<Role>, ttl: std::time::Duration) -> Self {
        let now = now_secs();
        Self {
            sub: player.inner(),
            usr: display_name,
            roles,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }

    pub fn expired(&self) -> bool {
        self.exp < now_secs()
    }

    pub fn player(&self) -> ID<Member> {
        ID::from(self.sub)
    }

    pub fn display_name(&self) -> &str {
        &self.usr
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs() as i64
}
