//! Difficulty-tuned bot decision policies. Pure, deterministic given a
//! seeded `Prng` — like `dice-rules`, no I/O and no logging — called by the
//! turn engine's timeout/tick handling on behalf of bot participants.
use std::time::Duration;

use dice_core::{Difficulty, Unique};
use dice_rng::Prng;
use dice_rules::Die;

pub use dice_core::ID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    Roll,
    Score(Vec<ID<Die>>),
    Pass,
}

/// Think-time delay before the turn engine should apply the bot's chosen
/// action, tuned per difficulty.
pub fn think_time(difficulty: Difficulty) -> Duration {
    match difficulty {
        Difficulty::Easy => Duration::from_millis(2000),
        Difficulty::Normal => Duration::from_millis(1500),
        Difficulty::Hard => Duration::from_millis(800),
    }
}

/// Decides the bot's next move given the current pool. `has_active_roll`
/// distinguishes "no roll yet this turn" (must `Roll`) from "roll already
/// landed" (must `Score` or, if nothing is live, `Pass`).
pub fn decide(dice: &[Die], has_active_roll: bool, difficulty: Difficulty, rng: &mut Prng) -> BotAction {
    if !has_active_roll {
        return BotAction::Roll;
    }
    let mut live: Vec<&Die> = dice.iter().filter(|d| d.is_live()).collect();
    if live.is_empty() {
        return BotAction::Pass;
    }
    live.sort_by_key(|d| d.points());

    let selection = match difficulty {
        // Conservative: bank only the single safest die, minimizing variance.
        Difficulty::Hard => vec![live[0].id()],
        // Greedy: bank the best couple of dice available each roll.
        Difficulty::Normal => live.iter().take(live.len().min(2)).map(|d| d.id()).collect(),
        // Usually greedy like `normal`, but occasionally banks the worst
        // die instead of the best one.
        Difficulty::Easy => {
            let roll_the_mistake = rng.roll_die(100) <= 20;
            if roll_the_mistake {
                vec![live[live.len() - 1].id()]
            } else {
                vec![live[0].id()]
            }
        }
    };
    BotAction::Score(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_rules::DieKind;

    fn pool() -> Vec<Die> {
        let values = [1u8, 2, 3, 4, 5, 6];
        values
            .iter()
            .map(|&v| {
                let mut d = Die::new(DieKind::D6);
                d.set_value(v);
                d
            })
            .collect()
    }

    #[test]
    fn without_an_active_roll_the_bot_always_rolls() {
        let mut rng = Prng::for_roll("seed", 0);
        assert_eq!(decide(&pool(), false, Difficulty::Easy, &mut rng), BotAction::Roll);
    }

    #[test]
    fn hard_bots_bank_only_the_single_safest_die() {
        let mut rng = Prng::for_roll("seed", 1);
        match decide(&pool(), true, Difficulty::Hard, &mut rng) {
            BotAction::Score(selection) => assert_eq!(selection.len(), 1),
            other => panic!("expected a score action, got {other:?}"),
        }
    }

    #[test]
    fn normal_bots_bank_up_to_two_dice() {
        let mut rng = Prng::for_roll("seed", 2);
        match decide(&pool(), true, Difficulty::Normal, &mut rng) {
            BotAction::Score(selection) => assert_eq!(selection.len(), 2),
            other => panic!("expected a score action, got {other:?}"),
        }
    }

    #[test]
    fn passes_once_every_die_is_banked() {
        let mut dice = pool();
        for d in dice.iter_mut() {
            d.mark_scored();
        }
        let mut rng = Prng::for_roll("seed", 3);
        assert_eq!(decide(&dice, true, Difficulty::Hard, &mut rng), BotAction::Pass);
    }
}
