use std::time::SystemTime;

use dice_rules::Die;
use uuid::Uuid;

/// The canonical snapshot of a single roll, broadcast verbatim to clients.
/// Dice values are produced server-side only; clients never supply them.
#[derive(Debug, Clone)]
pub struct ActiveRoll {
    pub server_roll_id: Uuid,
    pub roll_index: u32,
    pub dice: Vec<Die>,
    pub rolled_at: SystemTime,
}
