//! HTTP and WebSocket transport: route handlers, `ApiError` mapping, the
//! shared `AppState`, and the background tickers that keep rooms, turns,
//! and audit retention moving without a client request driving them.
//!
//! One `App` wired up in `run()`, a per-connection bridge task for the
//! websocket (`routes::stream`), and a handful of `tokio::spawn`ed loops
//! standing in for per-room owner tasks.
mod error;
mod room_owner;
mod state;
mod tickers;
pub mod routes;

pub use error::ApiError;
pub use room_owner::{ActiveRollSnapshot, RoomHandle, TurnSnapshot};
pub use state::AppState;
pub use tickers::{
    run_audit_retention_ticker, run_bot_think_ticker, run_heartbeat_ticker, run_room_inactivity_ticker, run_turn_watchdog_ticker,
};

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dice_core::{interrupted, Unique};
use dice_store::Store;
use dice_stream::{EventKind, StreamEvent};

/// Registers every route onto `cfg`. Split out from `run()` so
/// integration tests can mount the same surface on an `actix_web::test`
/// service.
pub fn configure<S: Store + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(routes::identity::health))
        .route("/api/identity", web::get().to(routes::identity::get_identity::<S>))
        .route("/api/profile/{player_id}", web::get().to(routes::identity::get_profile::<S>))
        .route("/api/profile/{player_id}", web::put().to(routes::identity::put_profile::<S>))
        .route("/api/profile/{player_id}/scores", web::post().to(routes::identity::submit_score::<S>))
        .route("/api/leaderboard", web::get().to(routes::leaderboard::get_leaderboard::<S>))
        .route("/api/multiplayer/rooms", web::get().to(routes::rooms::list_rooms::<S>))
        .route("/api/multiplayer/rooms", web::post().to(routes::rooms::create_room::<S>))
        .route("/api/multiplayer/rooms/{code}/join", web::post().to(routes::rooms::join_by_code::<S>))
        .route("/api/multiplayer/sessions/{id}/join", web::post().to(routes::sessions::join_session::<S>))
        .route("/api/multiplayer/sessions/{id}/heartbeat", web::post().to(routes::sessions::heartbeat::<S>))
        .route("/api/multiplayer/sessions/{id}/refresh", web::post().to(routes::sessions::refresh::<S>))
        .route(
            "/api/multiplayer/sessions/{id}/participant-state",
            web::post().to(routes::sessions::participant_state::<S>),
        )
        .route("/api/multiplayer/sessions/{id}/leave", web::post().to(routes::sessions::leave::<S>))
        .route("/api/multiplayer/sessions/{id}/queue-next", web::post().to(routes::sessions::queue_next::<S>))
        .route("/api/multiplayer/sessions/{id}/moderate", web::post().to(routes::sessions::moderate::<S>))
        .route("/api/multiplayer/sessions/{id}/stream", web::get().to(routes::stream::stream_room::<S>))
        .route("/api/admin/overview", web::get().to(routes::admin::overview::<S>))
        .route("/api/admin/metrics", web::get().to(routes::admin::metrics::<S>))
        .route("/api/admin/rooms", web::get().to(routes::admin::list_rooms::<S>))
        .route("/api/admin/storage", web::get().to(routes::admin::storage::<S>))
        .route("/api/admin/audit", web::get().to(routes::admin::audit::<S>))
        .route("/api/admin/roles", web::get().to(routes::admin::roles::<S>))
        .route("/api/admin/rooms/{id}/expire", web::post().to(routes::admin::expire_room::<S>))
        .route("/api/admin/participants/{id}/remove", web::post().to(routes::admin::remove_participant::<S>))
        .route("/api/admin/roles/{uid}", web::put().to(routes::admin::assign_role::<S>))
        .route("/api/admin/moderation/terms", web::post().to(routes::admin::moderation_terms::<S>))
        .route("/api/admin/moderation/clear", web::post().to(routes::admin::moderation_clear::<S>));
}

/// Binds and runs the HTTP server. Blocks until the listener exits.
///
/// Signal handling is left to `dice_core::register_shutdown`'s ctrl-c task
/// (actix's own is disabled below) so there is exactly one place that
/// decides when a shutdown has been requested: `interrupted()`.
pub async fn run<S: Store + 'static>(state: Arc<AppState<S>>) -> std::io::Result<()> {
    let identity = state.identity.clone();
    let bind_addr = state.config.bind_addr.clone();
    let shutdown_drain = state.config.shutdown_drain;
    let shutdown_state = state.clone();
    log::info!("[transport] binding {bind_addr}");
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
            .app_data(web::Data::from(state.clone()))
            .app_data(web::Data::from(identity.clone()))
            .configure(configure::<S>)
    })
    .workers(6)
    .shutdown_timeout(shutdown_drain.as_secs())
    .disable_signals()
    .bind(bind_addr)?
    .run();

    let handle = server.handle();
    tokio::spawn(drain_on_shutdown(shutdown_state, handle));
    server.await
}

/// Polls `interrupted()` (flipped by `dice_core::register_shutdown`'s ctrl-c
/// handler) and, once set, publishes `room_closed:shutdown` to every open
/// room before asking actix to stop accepting connections and drain
/// in-flight handlers for up to `shutdown_drain`.
async fn drain_on_shutdown<S: Store + 'static>(state: Arc<AppState<S>>, handle: actix_web::dev::ServerHandle) {
    while !interrupted() {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    let rooms = state.rooms.all_rooms().await;
    log::warn!("[transport] shutdown requested, closing {} room(s)", rooms.len());
    for room in rooms {
        state
            .stream
            .publish(room.id(), StreamEvent::new(EventKind::RoomClosed, serde_json::json!({ "reason": "shutdown" })))
            .await;
    }
    // Give the per-room fan-out pumps a beat to actually push the frame out
    // before connections start getting dropped by the graceful stop below.
    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.stop(true).await;
}
