use dice_core::Difficulty;

use crate::{Die, DieKind};

/// Builds the fixed pool of dice a session plays with, before any values
/// have been rolled. Harder difficulties trade a slightly smaller pool for
/// higher-variance die kinds.
pub fn build_pool(difficulty: Difficulty) -> Vec<Die> {
    kinds_for(difficulty).into_iter().map(Die::new).collect()
}

fn kinds_for(difficulty: Difficulty) -> Vec<DieKind> {
    match difficulty {
        Difficulty::Easy => vec![DieKind::D6; 6],
        Difficulty::Normal => {
            let mut kinds = vec![DieKind::D6; 4];
            kinds.extend([DieKind::D8; 2]);
            kinds
        }
        Difficulty::Hard => vec![
            DieKind::D6,
            DieKind::D6,
            DieKind::D10,
            DieKind::D10,
            DieKind::D20,
            DieKind::D20,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_pool_is_six_d6() {
        let pool = build_pool(Difficulty::Easy);
        assert_eq!(pool.len(), 6);
        assert!(pool.iter().all(|d| d.kind() == DieKind::D6));
    }

    #[test]
    fn hard_pool_mixes_kinds() {
        let pool = build_pool(Difficulty::Hard);
        assert_eq!(pool.len(), 6);
        assert!(pool.iter().any(|d| d.kind() == DieKind::D20));
    }

    #[test]
    fn freshly_built_pool_is_all_live_and_unrolled() {
        let pool = build_pool(Difficulty::Normal);
        assert!(pool.iter().all(|d| d.is_live() && d.value() == 0));
    }
}
