use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Plain atomic counters/gauges rather than a metrics-crate dependency.
/// Every field is `fetch_add`/`store`d from the component that owns the
/// event, never computed after the fact.
#[derive(Default)]
pub struct Metrics {
    rooms_active: AtomicU64,
    participants_connected: AtomicU64,
    ws_connections_open: AtomicU64,
    turn_timeouts_total: AtomicU64,
    bot_advances_total: AtomicU64,
    join_failures_total: AtomicU64,
    moderation_actions_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rooms_active(&self, n: u64) {
        self.rooms_active.store(n, Ordering::Relaxed);
    }

    pub fn set_participants_connected(&self, n: u64) {
        self.participants_connected.store(n, Ordering::Relaxed);
    }

    pub fn ws_connection_opened(&self) {
        self.ws_connections_open.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ws_connection_closed(&self) {
        self.ws_connections_open.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn turn_timeout(&self) {
        self.turn_timeouts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bot_advance(&self) {
        self.bot_advances_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn join_failure(&self) {
        self.join_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn moderation_action(&self) {
        self.moderation_actions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rooms_active: self.rooms_active.load(Ordering::Relaxed),
            participants_connected: self.participants_connected.load(Ordering::Relaxed),
            ws_connections_open: self.ws_connections_open.load(Ordering::Relaxed),
            turn_timeouts_total: self.turn_timeouts_total.load(Ordering::Relaxed),
            bot_advances_total: self.bot_advances_total.load(Ordering::Relaxed),
            join_failures_total: self.join_failures_total.load(Ordering::Relaxed),
            moderation_actions_total: self.moderation_actions_total.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub rooms_active: u64,
    pub participants_connected: u64,
    pub ws_connections_open: u64,
    pub turn_timeouts_total: u64,
    pub bot_advances_total: u64,
    pub join_failures_total: u64,
    pub moderation_actions_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_connection_counters_move_with_open_and_close() {
        let metrics = Metrics::new();
        metrics.ws_connection_opened();
        metrics.ws_connection_opened();
        metrics.ws_connection_closed();
        assert_eq!(metrics.snapshot().ws_connections_open, 1);
    }

    #[test]
    fn gauges_reflect_the_latest_store_call() {
        let metrics = Metrics::new();
        metrics.set_rooms_active(3);
        metrics.set_rooms_active(5);
        assert_eq!(metrics.snapshot().rooms_active, 5);
    }
}
