//! Per-room owner task: the sole mutator of one session's `TurnEngine`.
//! Generalizes the teacher's `Room::run` single-task-per-room loop and the
//! `Actor::spawn` request/reply channel shape into a typed command enum with
//! oneshot acks, so handlers and tickers never lock the engine directly —
//! every mutation is serialized through one `mpsc` queue per room.
use std::time::SystemTime;

use dice_core::{Count, ID};
use dice_rules::Die;
use dice_sessions::Participant;
use dice_turn::{Phase, TurnEngine, TurnError, TurnEvent};
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

const COMMAND_BUFFER: usize = 32;

/// The active roll's wire-facing shape, duplicated from `dice_turn::ActiveRoll`
/// because the roll itself isn't `Serialize` (the engine never touches JSON).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActiveRollSnapshot {
    pub server_roll_id: Uuid,
    pub roll_index: u32,
    pub dice: Vec<Die>,
    pub rolled_at: SystemTime,
}

/// Read-only projection of a `TurnEngine`, refreshed by the owner task after
/// every command it applies. Cloned out of a `watch` channel, so reading it
/// never queues behind a mutation — this is the "snapshot read-through" the
/// concurrency model allows for reads.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TurnSnapshot {
    pub phase: Phase,
    pub round_index: u32,
    pub active_player_id: Option<ID<Participant>>,
    pub active_roll: Option<ActiveRollSnapshot>,
    pub turn_deadline_at: Option<SystemTime>,
    pub scoreboard: Vec<(ID<Participant>, Count)>,
    pub active_player_rolls_taken: u32,
}

impl TurnSnapshot {
    fn of(engine: &TurnEngine) -> Self {
        Self {
            phase: engine.phase(),
            round_index: engine.round_index(),
            active_player_id: engine.active_player(),
            active_roll: engine.active_roll().map(|r| ActiveRollSnapshot {
                server_roll_id: r.server_roll_id,
                roll_index: r.roll_index,
                dice: r.dice.clone(),
                rolled_at: r.rolled_at,
            }),
            turn_deadline_at: engine.turn_deadline_at(),
            scoreboard: engine.scoreboard(),
            active_player_rolls_taken: engine.active_player().map(|p| engine.rolls_taken_by(p)).unwrap_or_default(),
        }
    }
}

enum RoomCmd {
    SetTurnOrder {
        order: Vec<ID<Participant>>,
        now: SystemTime,
        reply: oneshot::Sender<Vec<TurnEvent>>,
    },
    RollIntent {
        caller: ID<Participant>,
        now: SystemTime,
        reply: oneshot::Sender<Result<Vec<TurnEvent>, TurnError>>,
    },
    ScoreSelection {
        caller: ID<Participant>,
        cited_roll_id: Uuid,
        selection: Vec<ID<Die>>,
        now: SystemTime,
        reply: oneshot::Sender<Result<Vec<TurnEvent>, TurnError>>,
    },
    Timeout {
        is_bot: bool,
        now: SystemTime,
        reply: oneshot::Sender<Vec<TurnEvent>>,
    },
    ActivePlayerLeft {
        leaving: ID<Participant>,
        now: SystemTime,
        reply: oneshot::Sender<Vec<TurnEvent>>,
    },
    QueueNext {
        order: Vec<ID<Participant>>,
        now: SystemTime,
        reply: oneshot::Sender<Vec<TurnEvent>>,
    },
}

/// A cheap, cloneable reference to a spawned room owner task. Sending a
/// command and awaiting its oneshot is the only way to mutate the engine;
/// `snapshot()` reads the latest published state without going through the
/// queue at all.
#[derive(Clone)]
pub struct RoomHandle {
    tx: mpsc::Sender<RoomCmd>,
    snapshot_rx: watch::Receiver<TurnSnapshot>,
}

impl RoomHandle {
    /// Spawns the owner task and returns a handle to it. The task exits on
    /// its own once every `RoomHandle` clone referencing it is dropped,
    /// mirroring the teacher's drop-the-sender-to-stop `Actor` lifecycle.
    pub fn spawn(mut engine: TurnEngine) -> Self {
        let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(TurnSnapshot::of(&engine));
        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    RoomCmd::SetTurnOrder { order, now, reply } => {
                        let events = engine.set_turn_order(order, now);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(events);
                    }
                    RoomCmd::RollIntent { caller, now, reply } => {
                        let result = engine.roll_intent(caller, now);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(result);
                    }
                    RoomCmd::ScoreSelection { caller, cited_roll_id, selection, now, reply } => {
                        let result = engine.score_selection(caller, cited_roll_id, selection, now);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(result);
                    }
                    RoomCmd::Timeout { is_bot, now, reply } => {
                        let events = engine.timeout(now, is_bot);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(events);
                    }
                    RoomCmd::ActivePlayerLeft { leaving, now, reply } => {
                        let events = engine.active_player_left(leaving, now);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(events);
                    }
                    RoomCmd::QueueNext { order, now, reply } => {
                        let events = engine.queue_next(order, now);
                        let _ = snapshot_tx.send(TurnSnapshot::of(&engine));
                        let _ = reply.send(events);
                    }
                }
            }
            log::debug!("[room-owner] session {} owner task exiting", engine.session_id());
        });
        Self { tx, snapshot_rx }
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> RoomCmd, default: T) -> T {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(build(reply)).await.is_err() {
            return default;
        }
        rx.await.unwrap_or(default)
    }

    pub async fn set_turn_order(&self, order: Vec<ID<Participant>>, now: SystemTime) -> Vec<TurnEvent> {
        self.call(|reply| RoomCmd::SetTurnOrder { order, now, reply }, Vec::new()).await
    }

    pub async fn roll_intent(&self, caller: ID<Participant>, now: SystemTime) -> Result<Vec<TurnEvent>, TurnError> {
        self.call(|reply| RoomCmd::RollIntent { caller, now, reply }, Err(TurnError::WrongPhase)).await
    }

    pub async fn score_selection(
        &self,
        caller: ID<Participant>,
        cited_roll_id: Uuid,
        selection: Vec<ID<Die>>,
        now: SystemTime,
    ) -> Result<Vec<TurnEvent>, TurnError> {
        self.call(
            |reply| RoomCmd::ScoreSelection { caller, cited_roll_id, selection, now, reply },
            Err(TurnError::WrongPhase),
        )
        .await
    }

    pub async fn timeout(&self, is_bot: bool, now: SystemTime) -> Vec<TurnEvent> {
        self.call(|reply| RoomCmd::Timeout { is_bot, now, reply }, Vec::new()).await
    }

    pub async fn active_player_left(&self, leaving: ID<Participant>, now: SystemTime) -> Vec<TurnEvent> {
        self.call(|reply| RoomCmd::ActivePlayerLeft { leaving, now, reply }, Vec::new()).await
    }

    pub async fn queue_next(&self, order: Vec<ID<Participant>>, now: SystemTime) -> Vec<TurnEvent> {
        self.call(|reply| RoomCmd::QueueNext { order, now, reply }, Vec::new()).await
    }

    /// Reads the latest published snapshot without queuing behind any
    /// in-flight mutation.
    pub fn snapshot(&self) -> TurnSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}
