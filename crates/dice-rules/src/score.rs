use dice_core::{Count, Unique, ID};
use dice_rng::Prng;

use crate::{Die, RulesError};

/// Rolls fresh values into every die that is still live (in play and not yet
/// scored), leaving already-banked dice untouched. The rng is expected to be
/// scoped to exactly one roll (`Prng::for_roll`), so repeated calls with the
/// same rng instance are not meaningful.
pub fn roll_live_dice(dice: &mut [Die], rng: &mut Prng) {
    for die in dice.iter_mut().filter(|d| d.is_live()) {
        let face = rng.roll_die(die.kind().max_face());
        die.set_value(face);
    }
}

/// Validates that `selection` is a non-empty set of dice that are all part
/// of `dice`, currently in play, and not already scored.
pub fn is_valid_selection(dice: &[Die], selection: &[ID<Die>]) -> bool {
    score_selection(dice, selection).is_ok()
}

/// Computes the total points for selecting `selection` out of `dice` and
/// returns them, or the first violated invariant. Does not mutate `dice`;
/// callers apply `Die::mark_scored` themselves once the selection commits.
pub fn score_selection(dice: &[Die], selection: &[ID<Die>]) -> Result<Count, RulesError> {
    if selection.is_empty() {
        return Err(RulesError::EmptySelection);
    }
    let mut total: Count = 0;
    for &id in selection {
        let die = dice
            .iter()
            .find(|d| d.id() == id)
            .ok_or(RulesError::DieNotInRoll(id))?;
        if die.scored() {
            return Err(RulesError::DieAlreadyScored(id));
        }
        if !die.in_play() {
            return Err(RulesError::DieNotInPlay(id));
        }
        total += die.points();
    }
    Ok(total)
}

/// True once every die in the pool has been banked — either this round's
/// scoring run is complete (`fullTurnRound`) or the whole match is over,
/// depending on what the caller passes in.
pub fn all_dice_exhausted(dice: &[Die]) -> bool {
    dice.iter().all(|d| d.scored())
}

/// True if no subset of the still-live dice can be legally scored — i.e.
/// the pool has live dice but none of them are selectable (a bust is
/// actually signaled by the roll producing zero live dice to select from;
/// this helper exists for callers that want to double check before ending
/// a turn early).
pub fn is_bust(dice: &[Die]) -> bool {
    !dice.iter().any(Die::is_live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DieKind;

    fn fixture_roll(values: [u8; 6]) -> Vec<Die> {
        values
            .iter()
            .map(|&v| {
                let mut d = Die::new(DieKind::D6);
                d.set_value(v);
                d
            })
            .collect()
    }

    /// S1 Solo scoring: seed "abc", d6 pool of 6, literal roll
    /// [3,5,1,6,2,4]. Selecting {6,1} should yield 0 + 5 = 5.
    #[test]
    fn s1_solo_scoring() {
        let dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        let six = dice.iter().find(|d| d.value() == 6).unwrap().id();
        let one = dice.iter().find(|d| d.value() == 1).unwrap().id();
        let points = score_selection(&dice, &[six, one]).unwrap();
        assert_eq!(points, 5);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        assert!(matches!(
            score_selection(&dice, &[]),
            Err(RulesError::EmptySelection)
        ));
    }

    #[test]
    fn die_not_in_roll_is_rejected() {
        let dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        let foreign = ID::default();
        assert!(matches!(
            score_selection(&dice, &[foreign]),
            Err(RulesError::DieNotInRoll(_))
        ));
    }

    #[test]
    fn already_scored_die_is_rejected() {
        let mut dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        let id = dice[0].id();
        dice[0].mark_scored();
        assert!(matches!(
            score_selection(&dice, &[id]),
            Err(RulesError::DieAlreadyScored(_))
        ));
    }

    #[test]
    fn all_scored_means_exhausted() {
        let mut dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        assert!(!all_dice_exhausted(&dice));
        for d in dice.iter_mut() {
            d.mark_scored();
        }
        assert!(all_dice_exhausted(&dice));
    }

    #[test]
    fn roll_live_dice_skips_scored() {
        let mut dice = fixture_roll([3, 5, 1, 6, 2, 4]);
        dice[0].mark_scored();
        let frozen = dice[0].value();
        let mut rng = Prng::for_roll("seed", 1);
        roll_live_dice(&mut dice, &mut rng);
        assert_eq!(dice[0].value(), frozen);
    }
}
