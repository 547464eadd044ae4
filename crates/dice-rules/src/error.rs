use dice_core::ID;

use crate::Die;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RulesError {
    #[error("selection is empty")]
    EmptySelection,
    #[error("die {0} is not part of this roll")]
    DieNotInRoll(ID<Die>),
    #[error("die {0} is not in play")]
    DieNotInPlay(ID<Die>),
    #[error("die {0} has already been scored")]
    DieAlreadyScored(ID<Die>),
}

impl RulesError {
    /// Collapses any of the above into the single wire-level reason code:
    /// `EInvalidSelection`.
    pub fn reason(&self) -> &'static str {
        "EInvalidSelection"
    }
}
