//! Orchestrator binary: reads configuration, wires every domain service
//! into one `AppState`, starts the background tickers, and serves HTTP +
//! WebSocket traffic until interrupted.
use std::sync::Arc;
use std::time::Duration;

use dice_admin::{AdminService, Metrics};
use dice_audit::AuditLog;
use dice_auth::{AuthMode, Crypto, IdentityService};
use dice_core::Config;
use dice_leaderboard::LeaderboardService;
use dice_moderation::{AdaptiveTermSet, ModerationService};
use dice_rooms::RoomRegistry;
use dice_sessions::SessionManager;
use dice_store::{AnyStore, DocumentStore, FileStore, StoreBackend};
use dice_stream::StreamHub;
use dice_transport::AppState;

// Strike ladder thresholds. Not exposed through `Config` (no operator has
// asked to tune them yet); revisit as a config field if that changes.
const MODERATION_STRIKE_THRESHOLD: u32 = 3;
const MODERATION_BAN_THRESHOLD: u32 = 5;
const MODERATION_MUTE_WINDOW: Duration = Duration::from_secs(5 * 60);

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[backend] invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    dice_core::init_logging();

    // `dice-core` cannot depend on `dice-auth` (the reverse dependency
    // already exists), so `AUTH_MODE` is parsed here rather than living on
    // `Config` alongside the rest of the environment-derived settings.
    let auth_mode = match std::env::var("AUTH_MODE") {
        Ok(raw) => match AuthMode::parse(&raw) {
            Some(mode) => mode,
            None => {
                log::error!("[backend] invalid AUTH_MODE '{raw}'");
                std::process::exit(1);
            }
        },
        Err(_) => AuthMode::Auto,
    };

    let store: Arc<AnyStore> = match config.store_backend {
        StoreBackend::File => match FileStore::open(&config.file_store_dir) {
            Ok(store) => Arc::new(AnyStore::File(store)),
            Err(e) => {
                log::error!("[backend] failed to open file store: {e}");
                std::process::exit(2);
            }
        },
        StoreBackend::Document => {
            let url = config.document_store_url.as_deref().unwrap_or_default();
            match DocumentStore::connect(url).await {
                Ok(store) => Arc::new(AnyStore::Document(store)),
                Err(e) => {
                    log::error!("[backend] failed to connect document store: {e}");
                    std::process::exit(2);
                }
            }
        }
    };

    let identity = Arc::new(IdentityService::new(
        Crypto::new(config.jwt_secret.as_bytes()),
        config.jwt_secret.as_bytes().to_vec(),
        auth_mode,
        config.admin_access_mode,
        config.admin_token.clone(),
    ));
    let rooms = Arc::new(RoomRegistry::new());
    let sessions = Arc::new(SessionManager::new());
    let stream = Arc::new(StreamHub::default());
    let moderation = Arc::new(ModerationService::new(
        AdaptiveTermSet::new(),
        MODERATION_STRIKE_THRESHOLD,
        MODERATION_BAN_THRESHOLD,
        MODERATION_MUTE_WINDOW,
    ));
    let audit = Arc::new(AuditLog::new(store.clone(), config.audit_retention));
    let metrics = Arc::new(Metrics::new());
    let admin = Arc::new(AdminService::new(
        store.clone(),
        rooms.clone(),
        sessions.clone(),
        moderation.clone(),
        audit.clone(),
        metrics,
    ));
    let leaderboard = Arc::new(LeaderboardService::new(store.clone()));

    rooms.ensure_public_rooms().await;

    let state = Arc::new(AppState::new(
        config.clone(),
        identity,
        rooms,
        sessions,
        stream,
        moderation,
        leaderboard,
        admin,
    ));

    tokio::spawn(dice_transport::run_heartbeat_ticker(state.clone()));
    tokio::spawn(dice_transport::run_turn_watchdog_ticker(state.clone()));
    tokio::spawn(dice_transport::run_bot_think_ticker(state.clone()));
    tokio::spawn(dice_transport::run_room_inactivity_ticker(state.clone()));
    tokio::spawn(dice_transport::run_audit_retention_ticker(state.clone(), audit));

    dice_core::register_shutdown(config.shutdown_drain);

    if let Err(e) = dice_transport::run(state).await {
        log::error!("[backend] server exited: {e}");
        std::process::exit(3);
    }
}
