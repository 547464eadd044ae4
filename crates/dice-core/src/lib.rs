//! Core type aliases, the `ID<T>` identity type, configuration, and runtime
//! utilities shared by every dice-room crate.
#![allow(dead_code)]

mod backoff;
mod config;
mod domain;
mod id;
#[cfg(feature = "server")]
mod runtime;

pub use backoff::Backoff;
pub use config::{AdminAccessMode, Config, ConfigError, StoreBackend};
pub use domain::{Difficulty, RoomStatus, TurnMode, Visibility};
pub use id::{Unique, ID};
#[cfg(feature = "server")]
pub use runtime::{init_logging, interrupted, register_shutdown};

/// Monotonic roll/turn counters and point totals.
pub type Count = u32;
/// A single die's pip value, 1-6.
pub type Pip = u8;
