use std::time::Duration;

use dice_core::Difficulty;

/// Difficulty-scaled turn clock: a ~30s default, scaled per difficulty.
pub fn turn_timeout(difficulty: Difficulty) -> Duration {
    match difficulty {
        Difficulty::Easy => Duration::from_secs(45),
        Difficulty::Normal => Duration::from_secs(30),
        Difficulty::Hard => Duration::from_secs(20),
    }
}

/// Time before the deadline at which a `turn_warning` should fire.
pub const TURN_WARNING_LEAD: Duration = Duration::from_secs(5);

/// Default delay before `QueueNext` auto-starts a fresh match.
pub const QUEUE_NEXT_DELAY: Duration = Duration::from_secs(60);
