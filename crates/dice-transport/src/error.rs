use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Central error type every handler returns. Maps every domain error from
/// `dice-rooms`/`dice-sessions`/`dice-turn`/`dice-auth`/`dice-moderation`/
/// `dice-store`/`dice-leaderboard`/`dice-admin` to an HTTP status code.
/// Handlers never hand-build a status code themselves.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("it is not your turn")]
    WrongTurn,
    #[error("action is not valid in the current phase")]
    WrongPhase,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(String),
    #[error("room is full")]
    RoomFull,
    #[error("room is closed")]
    RoomClosed,
    #[error("caller is banned from this room")]
    RoomBanned,
    #[error("muted until {0:?}")]
    Muted(std::time::SystemTime),
    #[error("blocked")]
    Blocked,
    #[error("temporarily unavailable, retry shortly")]
    Transient,
    #[error("internal error (correlation id {0})")]
    Internal(uuid::Uuid),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "EBadRequest",
            Self::InvalidSelection(_) => "EInvalidSelection",
            Self::WrongTurn => "EWrongTurn",
            Self::WrongPhase => "EWrongPhase",
            Self::Unauthenticated => "EUnauthenticated",
            Self::Forbidden => "EForbidden",
            Self::NotFound(_) => "ENotFound",
            Self::RoomFull => "ERoomFull",
            Self::RoomClosed => "ERoomClosed",
            Self::RoomBanned => "ERoomBanned",
            Self::Muted(_) => "EMuted",
            Self::Blocked => "EBlocked",
            Self::Transient => "ETransient",
            Self::Internal(_) => "EInternal",
        }
    }

    pub fn internal() -> Self {
        let correlation = uuid::Uuid::new_v4();
        log::error!("[transport] internal error, correlation id {correlation}");
        Self::Internal(correlation)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidSelection(_) | Self::WrongTurn | Self::WrongPhase => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RoomFull | Self::RoomClosed | Self::RoomBanned | Self::Muted(_) | Self::Blocked => StatusCode::CONFLICT,
            Self::Transient => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self, Self::Transient) {
            builder.insert_header(("Retry-After", "2"));
        }
        builder.json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        })
    }
}

impl From<dice_rooms::RoomError> for ApiError {
    fn from(e: dice_rooms::RoomError) -> Self {
        match e {
            dice_rooms::RoomError::NotFound(id) => Self::NotFound(format!("room {id}")),
            dice_rooms::RoomError::CodeNotFound => Self::NotFound("room".into()),
            dice_rooms::RoomError::Full(_) => Self::RoomFull,
            dice_rooms::RoomError::Banned(_) => Self::RoomBanned,
            dice_rooms::RoomError::Closed(_) => Self::RoomClosed,
        }
    }
}

impl From<dice_sessions::SessionError> for ApiError {
    fn from(e: dice_sessions::SessionError) -> Self {
        match e {
            dice_sessions::SessionError::SessionNotFound(id) => Self::NotFound(format!("session {id}")),
            dice_sessions::SessionError::ParticipantNotFound(id) => Self::NotFound(format!("participant {id}")),
            dice_sessions::SessionError::SeatTaken(seat) => Self::BadRequest(format!("seat {seat} is taken")),
            dice_sessions::SessionError::SeatOutOfRange(seat) => Self::BadRequest(format!("seat {seat} is out of range")),
            dice_sessions::SessionError::SessionClosed(id) => Self::NotFound(format!("session {id}")),
        }
    }
}

impl From<dice_turn::TurnError> for ApiError {
    fn from(e: dice_turn::TurnError) -> Self {
        match e {
            dice_turn::TurnError::WrongTurn(_) => Self::WrongTurn,
            dice_turn::TurnError::WrongPhase | dice_turn::TurnError::StaleRoll => Self::WrongPhase,
            dice_turn::TurnError::InvalidSelection(e) => Self::InvalidSelection(e.to_string()),
        }
    }
}

impl From<dice_auth::AuthError> for ApiError {
    fn from(e: dice_auth::AuthError) -> Self {
        match e {
            dice_auth::AuthError::Forbidden => Self::Forbidden,
            _ => Self::Unauthenticated,
        }
    }
}

impl From<dice_moderation::ModerationError> for ApiError {
    fn from(e: dice_moderation::ModerationError) -> Self {
        match e {
            dice_moderation::ModerationError::Muted(until) => Self::Muted(until),
            dice_moderation::ModerationError::Blocked => Self::Blocked,
        }
    }
}

impl From<dice_store::StoreError> for ApiError {
    fn from(e: dice_store::StoreError) -> Self {
        match e {
            dice_store::StoreError::NotFound { section, key } => Self::NotFound(format!("{section}/{key}")),
            dice_store::StoreError::Transient(_) => Self::Transient,
            dice_store::StoreError::Permanent(_) => Self::internal(),
        }
    }
}

impl From<dice_leaderboard::LeaderboardError> for ApiError {
    fn from(e: dice_leaderboard::LeaderboardError) -> Self {
        match e {
            dice_leaderboard::LeaderboardError::Store(e) => e.into(),
            dice_leaderboard::LeaderboardError::ProfileNotFound(id) => Self::NotFound(format!("profile {id}")),
            dice_leaderboard::LeaderboardError::SettingsRequireFederatedIdentity => Self::Forbidden,
            dice_leaderboard::LeaderboardError::UnknownMode(m) => Self::BadRequest(format!("unknown mode '{m}'")),
            dice_leaderboard::LeaderboardError::UnknownWindow(w) => Self::BadRequest(format!("unknown window '{w}'")),
            dice_leaderboard::LeaderboardError::Encode(_) | dice_leaderboard::LeaderboardError::Decode(_) => Self::internal(),
        }
    }
}

impl From<dice_admin::AdminError> for ApiError {
    fn from(e: dice_admin::AdminError) -> Self {
        match e {
            dice_admin::AdminError::Room(e) => e.into(),
            dice_admin::AdminError::Session(e) => e.into(),
            dice_admin::AdminError::Store(e) => e.into(),
            dice_admin::AdminError::Audit(_) => Self::internal(),
            dice_admin::AdminError::Decode(_) => Self::internal(),
            dice_admin::AdminError::UnknownRole(r) => Self::BadRequest(format!("unknown role '{r}'")),
        }
    }
}
