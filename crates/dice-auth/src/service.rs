use dice_core::{AdminAccessMode, ID};

use crate::{AuthError, AuthMode, Claims, Crypto, LegacyToken, Lurker, Member, Role, User};

/// The identity service: resolves a bearer token (or its absence) into a
/// `User`, per the configured `AuthMode`, and separately checks admin
/// access per `AdminAccessMode`. Constructed once by the orchestrator and
/// shared behind `web::Data`/`Arc`.
pub struct IdentityService {
    crypto: Crypto,
    legacy_secret: Vec<u8>,
    mode: AuthMode,
    admin_mode: AdminAccessMode,
    admin_token: Option<String>,
}

impl IdentityService {
    pub fn new(
        crypto: Crypto,
        legacy_secret: Vec<u8>,
        mode: AuthMode,
        admin_mode: AdminAccessMode,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            crypto,
            legacy_secret,
            mode,
            admin_mode,
            admin_token,
        }
    }

    pub fn crypto(&self) -> &Crypto {
        &self.crypto
    }

    /// Resolves a bearer token into a federated member id, or falls back to
    /// issuing a fresh anonymous identity when `token` is `None`.
    pub fn resolve(&self, token: Option<&str>) -> User {
        let Some(token) = token else {
            return User::Anon(Lurker::default());
        };
        match self.decode(token) {
            Ok(claims) => User::Auth(Member::new(claims.player(), claims.display_name().to_string(), String::new())),
            Err(_) => User::Anon(Lurker::default()),
        }
    }

    fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        match self.mode {
            AuthMode::Strict => self.decode_strict(token),
            AuthMode::Legacy => self.decode_legacy(token),
            AuthMode::Auto => self
                .decode_strict(token)
                .or_else(|_| self.decode_legacy(token)),
        }
    }

    fn decode_strict(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.crypto.decode(token).map_err(|_| AuthError::MalformedToken)?;
        if claims.expired() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn decode_legacy(&self, token: &str) -> Result<Claims, AuthError> {
        let player = LegacyToken::verify(&self.legacy_secret, token)?;
        Ok(Claims::new(player, String::new(), vec![], Crypto::duration()))
    }

    /// Checks admin access for a request carrying `shared_secret` (the
    /// `X-Admin-Token` header) and/or `claims` (a decoded bearer token),
    /// per `AdminAccessMode`.
    pub fn check_admin(&self, shared_secret: Option<&str>, claims: Option<&Claims>) -> Result<(), AuthError> {
        match self.admin_mode {
            AdminAccessMode::Disabled => Err(AuthError::Forbidden),
            AdminAccessMode::Open => Ok(()),
            AdminAccessMode::Token => self.check_token(shared_secret),
            AdminAccessMode::Role => self.check_role(claims),
            AdminAccessMode::Hybrid => self
                .check_token(shared_secret)
                .or_else(|_| self.check_role(claims)),
        }
    }

    fn check_token(&self, shared_secret: Option<&str>) -> Result<(), AuthError> {
        match (&self.admin_token, shared_secret) {
            (Some(expected), Some(got)) if expected == got => Ok(()),
            _ => Err(AuthError::Forbidden),
        }
    }

    fn check_role(&self, claims: Option<&Claims>) -> Result<(), AuthError> {
        claims
            .filter(|c| !c.expired())
            .filter(|c| c.roles.iter().any(|r| *r >= Role::Viewer))
            .map(|_| ())
            .ok_or(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(mode: AuthMode, admin_mode: AdminAccessMode) -> IdentityService {
        IdentityService::new(
            Crypto::new(b"test-secret"),
            b"legacy-secret".to_vec(),
            mode,
            admin_mode,
            Some("shared-secret".into()),
        )
    }

    #[test]
    fn missing_token_resolves_to_anonymous() {
        let svc = service(AuthMode::Auto, AdminAccessMode::Hybrid);
        assert!(svc.resolve(None).is_anonymous());
    }

    #[test]
    fn strict_mode_accepts_valid_jwt() {
        let svc = service(AuthMode::Strict, AdminAccessMode::Hybrid);
        let claims = Claims::new(ID::default(), "Ada".into(), vec![], Crypto::duration());
        let token = svc.crypto().encode(&claims).unwrap();
        assert!(!svc.resolve(Some(&token)).is_anonymous());
    }

    #[test]
    fn strict_mode_rejects_legacy_token() {
        let svc = service(AuthMode::Strict, AdminAccessMode::Hybrid);
        let token = LegacyToken::sign(b"legacy-secret", ID::default(), std::time::Duration::from_secs(60));
        assert!(svc.resolve(Some(&token)).is_anonymous());
    }

    #[test]
    fn auto_mode_falls_back_to_legacy() {
        let svc = service(AuthMode::Auto, AdminAccessMode::Hybrid);
        let token = LegacyToken::sign(b"legacy-secret", ID::default(), std::time::Duration::from_secs(60));
        assert!(!svc.resolve(Some(&token)).is_anonymous());
    }

    #[test]
    fn admin_token_mode_requires_matching_secret() {
        let svc = service(AuthMode::Auto, AdminAccessMode::Token);
        assert!(svc.check_admin(Some("shared-secret"), None).is_ok());
        assert!(svc.check_admin(Some("wrong"), None).is_err());
    }

    #[test]
    fn admin_disabled_mode_always_forbids() {
        let svc = service(AuthMode::Auto, AdminAccessMode::Disabled);
        assert!(svc.check_admin(Some("shared-secret"), None).is_err());
    }
}
