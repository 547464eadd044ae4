use dice_core::Difficulty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ScoreEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Ranks by each player's single best (lowest) match score.
    BestScore,
    /// Ranks by total matches submitted, most active first.
    MatchesPlayed,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "best_score" => Some(Self::BestScore),
            "matches_played" => Some(Self::MatchesPlayed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    AllTime,
    Daily,
    Weekly,
}

impl Window {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all_time" => Some(Self::AllTime),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    pub fn cutoff(self, now: std::time::SystemTime) -> Option<std::time::SystemTime> {
        match self {
            Self::AllTime => None,
            Self::Daily => Some(now - std::time::Duration::from_secs(24 * 3600)),
            Self::Weekly => Some(now - std::time::Duration::from_secs(7 * 24 * 3600)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub player_id: Uuid,
    pub best_score: u32,
    pub matches_played: u32,
}

/// Builds a ranked page from the raw `ScoreEntry` rows already filtered to
/// `difficulty`/`window` by the caller. Lowest `best_score` wins; ties
/// broken by fewer `matches_played` (the fewest-busts/fewest-rolls
/// secondary criteria apply within a single match — across matches, the
/// fewest-games tiebreak rewards efficiency the same way).
pub fn rank(entries: &[ScoreEntry], difficulty: Difficulty, window_cutoff: Option<std::time::SystemTime>, mode: Mode) -> Vec<LeaderboardRow> {
    use std::collections::HashMap;
    let mut by_player: HashMap<Uuid, LeaderboardRow> = HashMap::new();
    for entry in entries {
        if entry.difficulty != difficulty {
            continue;
        }
        if let Some(cutoff) = window_cutoff {
            if entry.submitted_at < cutoff {
                continue;
            }
        }
        let row = by_player.entry(entry.player_id).or_insert(LeaderboardRow {
            player_id: entry.player_id,
            best_score: entry.total_score,
            matches_played: 0,
        });
        // Monotone: a worse score never overwrites a previously-seen better one.
        row.best_score = row.best_score.min(entry.total_score);
        row.matches_played += 1;
    }
    let mut rows: Vec<LeaderboardRow> = by_player.into_values().collect();
    match mode {
        Mode::BestScore => rows.sort_by(|a, b| a.best_score.cmp(&b.best_score).then(a.matches_played.cmp(&b.matches_played))),
        Mode::MatchesPlayed => rows.sort_by(|a, b| b.matches_played.cmp(&a.matches_played).then(a.best_score.cmp(&b.best_score))),
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entry(player: Uuid, score: u32, at: SystemTime) -> ScoreEntry {
        ScoreEntry {
            id: format!("{player}-{score}"),
            player_id: player,
            session_id: Uuid::new_v4(),
            difficulty: Difficulty::Normal,
            total_score: score,
            busts: 0,
            rolls_taken: 3,
            submitted_at: at,
        }
    }

    #[test]
    fn ranking_picks_each_players_best_score() {
        let now = SystemTime::now();
        let player = Uuid::new_v4();
        let entries = vec![entry(player, 40, now), entry(player, 20, now)];
        let rows = rank(&entries, Difficulty::Normal, None, Mode::BestScore);
        assert_eq!(rows[0].best_score, 20);
    }

    #[test]
    fn a_worse_later_submission_never_raises_best_score() {
        let now = SystemTime::now();
        let player = Uuid::new_v4();
        let entries = vec![entry(player, 15, now), entry(player, 99, now)];
        let rows = rank(&entries, Difficulty::Normal, None, Mode::BestScore);
        assert_eq!(rows[0].best_score, 15);
    }

    #[test]
    fn lower_score_outranks_higher_score() {
        let now = SystemTime::now();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![entry(a, 50, now), entry(b, 10, now)];
        let rows = rank(&entries, Difficulty::Normal, None, Mode::BestScore);
        assert_eq!(rows[0].player_id, b);
    }

    #[test]
    fn window_cutoff_excludes_old_entries() {
        let now = SystemTime::now();
        let old = now - std::time::Duration::from_secs(999_999);
        let player = Uuid::new_v4();
        let entries = vec![entry(player, 10, old)];
        let rows = rank(&entries, Difficulty::Normal, Some(now - std::time::Duration::from_secs(10)), Mode::BestScore);
        assert!(rows.is_empty());
    }
}
