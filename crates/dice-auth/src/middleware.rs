use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::web;
use actix_web::FromRequest;
use actix_web::HttpRequest;

use crate::{IdentityService, User};

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Resolves the caller's `User` for every request: federated if a bearer
/// token decodes, anonymous otherwise. Never fails `from_request` — the
/// anonymous fallback is itself a spec-mandated success path.
pub struct Identity(pub User);

impl Identity {
    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let service = req.app_data::<web::Data<IdentityService>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let service = service.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("identity service not configured")
            })?;
            Ok(Identity(service.resolve(token.as_deref())))
        })
    }
}

/// Extractor enforcing admin access per the configured `AdminAccessMode`.
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let service = req.app_data::<web::Data<IdentityService>>().cloned();
        let shared_secret = req
            .headers()
            .get("X-Admin-Token")
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned);
        let token = bearer_token(req);
        Box::pin(async move {
            let service = service.ok_or_else(|| {
                actix_web::error::ErrorInternalServerError("identity service not configured")
            })?;
            let claims = token.as_deref().and_then(|t| service.crypto().decode(t).ok());
            service
                .check_admin(shared_secret.as_deref(), claims.as_ref())
                .map(|()| AdminAuth)
                .map_err(|_| actix_web::error::ErrorForbidden("admin access denied"))
        })
    }
}
