use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use dice_core::{Count, Difficulty, TurnMode, Unique, ID};
use dice_rules::{all_dice_exhausted, build_pool, score_selection, Die};
use dice_rng::Prng;
use dice_sessions::{Participant, Session};
use uuid::Uuid;

use crate::config::turn_timeout;
use crate::error::TurnError;
use crate::event::TurnEvent;
use crate::phase::Phase;
use crate::roll::ActiveRoll;
use crate::score_log::{compute_log_id, ScoreLogEntry};

/// Owns the single canonical `TurnState` for one session and drives it
/// through its phases. No I/O; the room owner task calls these methods
/// and broadcasts the returned events.
pub struct TurnEngine {
    session_id: ID<Session>,
    session_seed: String,
    difficulty: Difficulty,
    turn_mode: TurnMode,
    match_target_rounds: u32,

    phase: Phase,
    turn_order: Vec<ID<Participant>>,
    active_seat: usize,
    round_index: u32,
    roll_index: u32,
    turn_deadline_at: Option<SystemTime>,
    is_first_roll_of_turn: bool,

    pools: HashMap<ID<Participant>, Vec<Die>>,
    active_roll: Option<ActiveRoll>,
    scores: HashMap<ID<Participant>, Count>,
    busts: HashMap<ID<Participant>, u32>,
    rolls_taken: HashMap<ID<Participant>, u32>,
    score_log: Vec<ScoreLogEntry>,
}

impl TurnEngine {
    pub fn new(session_id: ID<Session>, session_seed: String, difficulty: Difficulty, turn_mode: TurnMode, match_target_rounds: u32) -> Self {
        Self {
            session_id,
            session_seed,
            difficulty,
            turn_mode,
            match_target_rounds: match_target_rounds.max(1),
            phase: Phase::WaitingReady,
            turn_order: Vec::new(),
            active_seat: 0,
            round_index: 0,
            roll_index: 0,
            turn_deadline_at: None,
            is_first_roll_of_turn: true,
            pools: HashMap::new(),
            active_roll: None,
            scores: HashMap::new(),
            busts: HashMap::new(),
            rolls_taken: HashMap::new(),
            score_log: Vec::new(),
        }
    }

    pub fn session_id(&self) -> ID<Session> {
        self.session_id
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn round_index(&self) -> u32 {
        self.round_index
    }
    pub fn active_player(&self) -> Option<ID<Participant>> {
        if matches!(self.phase, Phase::WaitingReady | Phase::MatchComplete) {
            return None;
        }
        self.turn_order.get(self.active_seat).copied()
    }
    pub fn active_roll(&self) -> Option<&ActiveRoll> {
        self.active_roll.as_ref()
    }
    pub fn turn_deadline_at(&self) -> Option<SystemTime> {
        self.turn_deadline_at
    }
    pub fn score_of(&self, participant_id: ID<Participant>) -> Count {
        self.scores.get(&participant_id).copied().unwrap_or(0)
    }
    pub fn scoreboard(&self) -> Vec<(ID<Participant>, Count)> {
        self.scores.iter().map(|(id, c)| (*id, *c)).collect()
    }
    pub fn busts_of(&self, participant_id: ID<Participant>) -> u32 {
        self.busts.get(&participant_id).copied().unwrap_or(0)
    }
    pub fn rolls_taken_by(&self, participant_id: ID<Participant>) -> u32 {
        self.rolls_taken.get(&participant_id).copied().unwrap_or(0)
    }

    /// Called whenever the session manager recomputes turn-order
    /// membership. Starts the first round once there's anyone to play.
    pub fn set_turn_order(&mut self, order: Vec<ID<Participant>>, now: SystemTime) -> Vec<TurnEvent> {
        self.turn_order = order;
        if self.phase == Phase::WaitingReady && !self.turn_order.is_empty() {
            return self.start_turn(now);
        }
        Vec::new()
    }

    fn timeout_for(&self) -> std::time::Duration {
        turn_timeout(self.difficulty)
    }

    /// Advances to the next seated+ready participant with a non-exhausted
    /// pool, starting the search at `active_seat`. Enters `matchComplete`
    /// if every pool is exhausted or the round target has been reached.
    fn start_turn(&mut self, now: SystemTime) -> Vec<TurnEvent> {
        if self.turn_order.is_empty() {
            self.phase = Phase::WaitingReady;
            return Vec::new();
        }
        for _ in 0..self.turn_order.len() {
            let candidate = self.turn_order[self.active_seat];
            let exhausted = {
                let pool = self.pools.entry(candidate).or_insert_with(|| build_pool(self.difficulty));
                all_dice_exhausted(pool)
            };
            if !exhausted {
                self.phase = Phase::PreRoll;
                self.is_first_roll_of_turn = true;
                self.turn_deadline_at = Some(now + self.timeout_for());
                return vec![TurnEvent::TurnStart {
                    round_index: self.round_index,
                    participant_id: candidate,
                }];
            }
            self.active_seat = (self.active_seat + 1) % self.turn_order.len();
        }
        self.phase = Phase::MatchComplete;
        vec![TurnEvent::MatchComplete { scores: self.scoreboard() }]
    }

    /// `RollIntent`: generates the roll via the seeded PRNG using
    /// `rollIndex = prev+1`. Idempotent if replayed while the same roll is
    /// still active (no new roll has started since).
    pub fn roll_intent(&mut self, caller: ID<Participant>, now: SystemTime) -> Result<Vec<TurnEvent>, TurnError> {
        if self.active_player() != Some(caller) {
            return Err(TurnError::WrongTurn(caller));
        }
        if self.phase == Phase::PostRoll {
            // Duplicate retry after the roll already landed: resend, don't reroll.
            return Ok(self.active_roll.as_ref().map(|r| vec![TurnEvent::from(r)]).unwrap_or_default());
        }
        if self.phase != Phase::PreRoll {
            return Err(TurnError::WrongPhase);
        }

        self.roll_index += 1;
        let mut rng = Prng::for_roll(&self.session_seed, self.roll_index);
        let pool = self.pools.get_mut(&caller).expect("pool seeded in start_turn");
        dice_rules::roll_live_dice(pool, &mut rng);

        let active_roll = ActiveRoll {
            server_roll_id: Uuid::new_v4(),
            roll_index: self.roll_index,
            dice: pool.clone(),
            rolled_at: now,
        };
        let roll_event = TurnEvent::from(&active_roll);
        self.active_roll = Some(active_roll);
        self.phase = Phase::PostRoll;
        self.turn_deadline_at = Some(now + self.timeout_for());
        *self.rolls_taken.entry(caller).or_default() += 1;

        let mut events = Vec::new();
        if self.is_first_roll_of_turn {
            events.push(TurnEvent::TurnStart {
                round_index: self.round_index,
                participant_id: caller,
            });
            self.is_first_roll_of_turn = false;
        }
        events.push(roll_event);
        Ok(events)
    }

    /// `ScoreSelection`: server re-runs the rules engine and ignores any
    /// client-claimed point value. Idempotent via the deterministic
    /// `scoreLog.id` hash.
    pub fn score_selection(
        &mut self,
        caller: ID<Participant>,
        cited_roll_id: Uuid,
        selection: Vec<ID<Die>>,
        now: SystemTime,
    ) -> Result<Vec<TurnEvent>, TurnError> {
        if self.active_player() != Some(caller) {
            return Err(TurnError::WrongTurn(caller));
        }
        if self.phase != Phase::PostRoll {
            return Err(TurnError::WrongPhase);
        }
        let active_roll = self.active_roll.as_ref().ok_or(TurnError::WrongPhase)?;
        if active_roll.server_roll_id != cited_roll_id {
            return Err(TurnError::StaleRoll);
        }
        let roll_index = active_roll.roll_index;
        let log_id = compute_log_id(self.session_id, caller, roll_index, &selection);
        if self.score_log.iter().any(|entry| entry.id == log_id) {
            return Ok(Vec::new());
        }

        let pool = self.pools.get_mut(&caller).expect("pool seeded in start_turn");
        let points = score_selection(pool, &selection)?;
        for die_id in &selection {
            if let Some(die) = pool.iter_mut().find(|d| d.id() == *die_id) {
                die.mark_scored();
            }
        }
        *self.scores.entry(caller).or_default() += points;
        self.score_log.push(ScoreLogEntry {
            id: log_id,
            participant_id: caller,
            roll_index,
            dice_selection: selection.clone(),
            points,
            at: now,
        });

        let mut events = vec![TurnEvent::ScoreCommitted {
            participant_id: caller,
            roll_index,
            dice_selection: selection,
            points,
        }];

        self.phase = Phase::Resolving;
        let exhausted = all_dice_exhausted(pool);
        match self.turn_mode {
            TurnMode::RollByRoll => events.extend(self.advance_after_turn(caller, exhausted, now)),
            TurnMode::FullTurnRound => {
                if exhausted {
                    events.extend(self.advance_after_turn(caller, true, now));
                } else {
                    // Same participant keeps rolling until their pool empties.
                    self.phase = Phase::PreRoll;
                    self.active_roll = None;
                    self.turn_deadline_at = Some(now + self.timeout_for());
                }
            }
        }
        Ok(events)
    }

    fn advance_after_turn(&mut self, who: ID<Participant>, pool_exhausted: bool, now: SystemTime) -> Vec<TurnEvent> {
        let mut events = vec![TurnEvent::TurnEnd {
            participant_id: who,
            pool_exhausted,
        }];
        self.phase = Phase::BetweenTurns;
        self.active_roll = None;
        if !self.turn_order.is_empty() {
            self.active_seat = (self.active_seat + 1) % self.turn_order.len();
            if self.active_seat == 0 {
                self.round_index += 1;
                if self.round_index >= self.match_target_rounds {
                    self.phase = Phase::MatchComplete;
                    events.push(TurnEvent::MatchComplete { scores: self.scoreboard() });
                    return events;
                }
            }
        }
        events.extend(self.start_turn(now));
        events
    }

    /// The active player neither rolled nor scored before `turnDeadlineAt`.
    /// In `preRoll` this rolls on behalf of the bot policy; a human active
    /// player is auto-skipped instead, since nothing stands in for a human's
    /// roll decision.
    pub fn timeout(&mut self, now: SystemTime, is_bot: bool) -> Vec<TurnEvent> {
        let Some(deadline) = self.turn_deadline_at else {
            return Vec::new();
        };
        if now < deadline {
            return Vec::new();
        }
        let Some(caller) = self.active_player() else {
            return Vec::new();
        };
        match self.phase {
            Phase::PreRoll if is_bot => match self.roll_intent(caller, now) {
                Ok(mut events) => {
                    events.push(TurnEvent::TimeoutAutoAdvance {
                        participant_id: caller,
                        phase: Phase::PreRoll,
                    });
                    events
                }
                Err(_) => Vec::new(),
            },
            Phase::PreRoll => {
                let mut events = self.advance_after_turn(caller, false, now);
                events.push(TurnEvent::TimeoutAutoAdvance {
                    participant_id: caller,
                    phase: Phase::PreRoll,
                });
                events
            }
            Phase::PostRoll => {
                let Some(active_roll) = self.active_roll.clone() else {
                    return Vec::new();
                };
                let best = active_roll
                    .dice
                    .iter()
                    .filter(|d| d.is_live())
                    .min_by_key(|d| d.points())
                    .map(|d| d.id());
                let Some(die_id) = best else {
                    return Vec::new();
                };
                match self.score_selection(caller, active_roll.server_roll_id, vec![die_id], now) {
                    Ok(mut events) => {
                        events.push(TurnEvent::TimeoutAutoAdvance {
                            participant_id: caller,
                            phase: Phase::PostRoll,
                        });
                        events
                    }
                    Err(_) => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    /// The active player's turn-order membership was revoked mid-turn.
    pub fn active_player_left(&mut self, leaving: ID<Participant>, now: SystemTime) -> Vec<TurnEvent> {
        let was_active = self.active_player() == Some(leaving);
        self.turn_order.retain(|id| *id != leaving);
        if self.active_seat >= self.turn_order.len() {
            self.active_seat = 0;
        }
        if !was_active {
            return Vec::new();
        }
        let mut events = vec![TurnEvent::TurnEnd {
            participant_id: leaving,
            pool_exhausted: false,
        }];
        self.phase = Phase::BetweenTurns;
        self.active_roll = None;
        events.extend(self.start_turn(now));
        events
    }

    /// Auto-restart after `matchComplete`, invoked once the session manager
    /// reports at least one seated+ready human remains.
    pub fn queue_next(&mut self, order: Vec<ID<Participant>>, now: SystemTime) -> Vec<TurnEvent> {
        self.turn_order = order;
        self.active_seat = 0;
        self.round_index = 0;
        self.roll_index = 0;
        self.pools.clear();
        self.scores.clear();
        self.busts.clear();
        self.rolls_taken.clear();
        self.score_log.clear();
        self.active_roll = None;
        self.phase = Phase::WaitingReady;
        self.start_turn(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(order: Vec<ID<Participant>>) -> TurnEngine {
        let mut engine = TurnEngine::new(ID::default(), "seed".into(), Difficulty::Easy, TurnMode::RollByRoll, 3);
        engine.set_turn_order(order, SystemTime::now());
        engine
    }

    #[test]
    fn wrong_turn_is_rejected() {
        let a = ID::default();
        let b = ID::default();
        let mut engine = engine(vec![a, b]);
        let result = engine.roll_intent(b, SystemTime::now());
        assert!(matches!(result, Err(TurnError::WrongTurn(_))));
    }

    #[test]
    fn roll_then_score_commits_points() {
        let a = ID::default();
        let mut engine = engine(vec![a]);
        assert_eq!(engine.phase(), Phase::PreRoll);
        engine.roll_intent(a, SystemTime::now()).unwrap();
        assert_eq!(engine.phase(), Phase::PostRoll);
        let roll = engine.active_roll().unwrap().clone();
        let die = roll.dice[0].id();
        let cited = roll.server_roll_id;
        engine.score_selection(a, cited, vec![die], SystemTime::now()).unwrap();
        assert!(engine.score_of(a) <= 6);
    }

    #[test]
    fn stale_roll_id_is_rejected() {
        let a = ID::default();
        let mut engine = engine(vec![a]);
        engine.roll_intent(a, SystemTime::now()).unwrap();
        let die = engine.active_roll().unwrap().dice[0].id();
        let result = engine.score_selection(a, Uuid::new_v4(), vec![die], SystemTime::now());
        assert!(matches!(result, Err(TurnError::StaleRoll)));
    }

    #[test]
    fn resubmitting_a_score_after_the_turn_moved_on_does_not_double_credit() {
        let a = ID::default();
        let mut engine = engine(vec![a]);
        engine.roll_intent(a, SystemTime::now()).unwrap();
        let roll = engine.active_roll().unwrap().clone();
        let die = roll.dice.iter().find(|d| d.is_live()).unwrap().id();
        engine.score_selection(a, roll.server_roll_id, vec![die], SystemTime::now()).unwrap();
        let before = engine.score_of(a);
        // rollByRoll mode has already advanced past this roll by the time a
        // retried request would arrive; the resubmission is rejected, not
        // silently re-applied.
        let result = engine.score_selection(a, roll.server_roll_id, vec![die], SystemTime::now());
        assert!(result.is_err());
        assert_eq!(engine.score_of(a), before);
    }

    #[test]
    fn same_score_log_id_dedups_when_phase_allows_resubmission() {
        use crate::score_log::compute_log_id;
        let session = ID::default();
        let player = ID::default();
        let die: ID<Die> = ID::default();
        let first = compute_log_id(session, player, 1, &[die]);
        let second = compute_log_id(session, player, 1, &[die]);
        assert_eq!(first, second);
    }

    #[test]
    fn timeout_in_pre_roll_auto_rolls_for_a_bot() {
        let a = ID::default();
        let mut engine = engine(vec![a]);
        let past_deadline = engine.turn_deadline_at().unwrap() + std::time::Duration::from_secs(1);
        let events = engine.timeout(past_deadline, true);
        assert!(events.iter().any(|e| matches!(e, TurnEvent::TimeoutAutoAdvance { .. })));
        assert_eq!(engine.phase(), Phase::PostRoll);
    }

    #[test]
    fn timeout_in_pre_roll_skips_a_human_instead_of_rolling_for_them() {
        let a = ID::default();
        let b = ID::default();
        let mut engine = engine(vec![a, b]);
        let past_deadline = engine.turn_deadline_at().unwrap() + std::time::Duration::from_secs(1);
        let events = engine.timeout(past_deadline, false);
        assert!(events.iter().any(|e| matches!(e, TurnEvent::TimeoutAutoAdvance { .. })));
        assert!(events.iter().any(|e| matches!(e, TurnEvent::TurnEnd { participant_id, .. } if *participant_id == a)));
        assert_eq!(engine.active_player(), Some(b));
        assert_eq!(engine.phase(), Phase::PreRoll);
    }

    #[test]
    fn active_player_left_advances_turn() {
        let a = ID::default();
        let b = ID::default();
        let mut engine = engine(vec![a, b]);
        let events = engine.active_player_left(a, SystemTime::now());
        assert!(events.iter().any(|e| matches!(e, TurnEvent::TurnEnd { .. })));
        assert_eq!(engine.active_player(), Some(b));
    }

    #[test]
    fn full_turn_round_keeps_same_player_until_pool_exhausted() {
        let a = ID::default();
        let b = ID::default();
        let mut engine = TurnEngine::new(ID::default(), "seed".into(), Difficulty::Easy, TurnMode::FullTurnRound, 5);
        engine.set_turn_order(vec![a, b], SystemTime::now());
        for _ in 0..6 {
            if engine.phase() == Phase::MatchComplete {
                break;
            }
            let active = engine.active_player().unwrap();
            if active != a {
                break;
            }
            engine.roll_intent(a, SystemTime::now()).unwrap();
            let die = engine.active_roll().unwrap().dice.iter().find(|d| d.is_live()).unwrap().id();
            let cited = engine.active_roll().unwrap().server_roll_id;
            engine.score_selection(a, cited, vec![die], SystemTime::now()).unwrap();
        }
        // once A's pool of 6 dice is fully scored the seat must advance to B
        assert_ne!(engine.active_player(), Some(a));
    }
}
