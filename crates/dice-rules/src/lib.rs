//! Pure dice scoring and pool-construction rules.
//!
//! No I/O, no logging, no async — deterministic functions over plain data
//! so the turn engine (`dice-turn`) can unit-test gameplay rules in
//! isolation and replay an action log byte-for-byte given the same dice
//! values.
mod die;
mod error;
mod pool;
mod score;

pub use die::{Die, DieKind};
pub use error::RulesError;
pub use pool::build_pool;
pub use score::{all_dice_exhausted, is_bust, is_valid_selection, roll_live_dice, score_selection};
