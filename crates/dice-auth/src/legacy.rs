use dice_core::ID;

use crate::{AuthError, Member};

/// `legacy`-mode token: a short, locally-signed `playerId|exp|signature`
/// string, distinct from the `strict`-mode JWT. Exists for older clients
/// that never adopted the JWT path; `auto` mode falls back to this format
/// when strict decoding fails.
pub struct LegacyToken;

impl LegacyToken {
    pub fn sign(secret: &[u8], player: ID<Member>, ttl: std::time::Duration) -> String {
        let exp = now_secs() + ttl.as_secs() as i64;
        let payload = format!("{}|{}", player, exp);
        let sig = Self::signature(secret, &payload);
        format!("{payload}|{sig}")
    }

    pub fn verify(secret: &[u8], token: &str) -> Result<ID<Member>, AuthError> {
        let mut parts = token.rsplitn(2, '|');
        let sig = parts.next().ok_or(AuthError::MalformedToken)?;
        let payload = parts.next().ok_or(AuthError::MalformedToken)?;
        if Self::signature(secret, payload) != sig {
            return Err(AuthError::InvalidSignature);
        }
        let mut fields = payload.splitn(2, '|');
        let player = fields.next().ok_or(AuthError::MalformedToken)?;
        let exp: i64 = fields
            .next()
            .ok_or(AuthError::MalformedToken)?
            .parse()
            .map_err(|_| AuthError::MalformedToken)?;
        if exp < now_secs() {
            return Err(AuthError::Expired);
        }
        ID::parse(player).map_err(|_| AuthError::MalformedToken)
    }

    fn signature(secret: &[u8], payload: &str) -> String {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        hasher.update(secret);
        hasher.update(b":");
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before epoch")
        .as_secs() as i64
}

/// Minimal hex encoding so legacy tokens stay dependency-light.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_round_trips() {
        let player: ID<Member> = ID::default();
        let token = LegacyToken::sign(b"secret", player, std::time::Duration::from_secs(60));
        assert_eq!(LegacyToken::verify(b"secret", &token).unwrap(), player);
    }

    #[test]
    fn tampered_token_fails() {
        let player: ID<Member> = ID::default();
        let mut token = LegacyToken::sign(b"secret", player, std::time::Duration::from_secs(60));
        token.push('x');
        assert!(LegacyToken::verify(b"secret", &token).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let player: ID<Member> = ID::default();
        let token = LegacyToken::sign(b"secret", player, std::time::Duration::from_secs(0));
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(
            LegacyToken::verify(b"secret", &token),
            Err(AuthError::Expired)
        ));
    }
}
