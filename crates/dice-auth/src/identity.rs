use dice_core::{Unique, ID};

use crate::{Lurker, Member};

/// Authentication state for a request or stream connection: anonymous or
/// federated. `playerId` is stable under upgrade so moving from `Anon` to
/// `Auth` never orphans prior room/session state tied to the old id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum User {
    Anon(Lurker),
    Auth(Member),
}

impl User {
    pub fn player_id(&self) -> ID<Member> {
        match self {
            Self::Auth(m) => m.id(),
            Self::Anon(l) => l.id().cast(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anon(_))
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Auth(m) => Some(m.display_name()),
            Self::Anon(_) => None,
        }
    }

    /// Moves a lurker's `playerId` onto a freshly-registered member: an
    /// anonymous identity may upgrade once to federated and keeps the same
    /// playerId. Returns the upgraded `Member`; callers are responsible for
    /// enforcing the "exactly once" part (checking `PlayerProfile.identity_kind`
    /// before calling this).
    pub fn upgrade_once(lurker: Lurker, display_name: String, external_subject: String) -> Member {
        Member::new(lurker.id().cast(), display_name, external_subject)
    }
}

impl From<Lurker> for User {
    fn from(lurker: Lurker) -> Self {
        Self::Anon(lurker)
    }
}

impl From<Member> for User {
    fn from(member: Member) -> Self {
        Self::Auth(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_keeps_the_same_player_id() {
        let lurker = Lurker::default();
        let before = User::from(lurker).player_id();
        let member = User::upgrade_once(lurker, "Ada".into(), "sub-1".into());
        let after = User::from(member).player_id();
        assert_eq!(before, after);
    }

    #[test]
    fn anonymous_has_no_display_name() {
        let user = User::from(Lurker::default());
        assert!(user.is_anonymous());
        assert_eq!(user.display_name(), None);
    }
}
