//! Player profile storage and ranked score submission. Scores are composite-
//! keyed documents written through `dice-store` rather than SQL tables.
mod error;
mod leaderboard;
mod profile;
mod score;

pub use error::LeaderboardError;
pub use leaderboard::{rank, LeaderboardRow, Mode, Window};
pub use profile::{IdentityKind, PlayerProfile};
pub use score::{compute_entry_id, ScoreEntry, ScoreSubmission};

use std::time::SystemTime;

use dice_store::Store;
use uuid::Uuid;

const PROFILES_SECTION: &str = "profiles";
const SCORES_SECTION: &str = "scores";

pub struct LeaderboardService<S> {
    store: S,
}

impl<S: Store> LeaderboardService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, player_id: Uuid) -> Result<Option<PlayerProfile>, LeaderboardError> {
        let doc = self.store.get(PROFILES_SECTION, &player_id.to_string()).await?;
        doc.map(|v| serde_json::from_value(v).map_err(|e| LeaderboardError::Decode(e.to_string())))
            .transpose()
    }

    pub async fn get_profile_or_create(&self, player_id: Uuid, default_name: &str) -> Result<PlayerProfile, LeaderboardError> {
        if let Some(profile) = self.get_profile(player_id).await? {
            return Ok(profile);
        }
        let profile = PlayerProfile::new_anonymous(player_id, default_name.to_string());
        self.put_profile(&profile).await?;
        Ok(profile)
    }

    async fn put_profile(&self, profile: &PlayerProfile) -> Result<(), LeaderboardError> {
        let doc = serde_json::to_value(profile).map_err(|e| LeaderboardError::Encode(e.to_string()))?;
        self.store.put(PROFILES_SECTION, &profile.player_id.to_string(), doc).await?;
        Ok(())
    }

    /// Applies a display-name/settings patch. Settings writes require a
    /// federated identity; display-name renames are open to anonymous
    /// players too.
    pub async fn upsert_profile(
        &self,
        player_id: Uuid,
        display_name: Option<String>,
        settings: Option<serde_json::Value>,
    ) -> Result<PlayerProfile, LeaderboardError> {
        let mut profile = self
            .get_profile(player_id)
            .await?
            .ok_or(LeaderboardError::ProfileNotFound(player_id))?;
        if settings.is_some() && !profile.is_federated() {
            return Err(LeaderboardError::SettingsRequireFederatedIdentity);
        }
        profile.apply_patch(display_name, settings);
        self.put_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn upgrade_profile_to_federated(&self, player_id: Uuid) -> Result<PlayerProfile, LeaderboardError> {
        let mut profile = self
            .get_profile(player_id)
            .await?
            .ok_or(LeaderboardError::ProfileNotFound(player_id))?;
        profile.upgrade_to_federated();
        self.put_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn block_player(&self, player_id: Uuid, blocked: Uuid) -> Result<PlayerProfile, LeaderboardError> {
        let mut profile = self
            .get_profile(player_id)
            .await?
            .ok_or(LeaderboardError::ProfileNotFound(player_id))?;
        profile.block(blocked);
        self.put_profile(&profile).await?;
        Ok(profile)
    }

    pub async fn unblock_player(&self, player_id: Uuid, blocked: Uuid) -> Result<PlayerProfile, LeaderboardError> {
        let mut profile = self
            .get_profile(player_id)
            .await?
            .ok_or(LeaderboardError::ProfileNotFound(player_id))?;
        profile.unblock(blocked);
        self.put_profile(&profile).await?;
        Ok(profile)
    }

    /// Writes a match result, keyed deterministically on `(session, player)`
    /// so a client retry or reconnect-and-replay is a no-op rather than a
    /// duplicate row.
    pub async fn submit_score(&self, player_id: Uuid, submission: ScoreSubmission) -> Result<ScoreEntry, LeaderboardError> {
        let entry = ScoreEntry::from_submission(player_id, submission, SystemTime::now());
        let doc = serde_json::to_value(&entry).map_err(|e| LeaderboardError::Encode(e.to_string()))?;
        self.store.put(SCORES_SECTION, &entry.id, doc).await?;
        log::debug!("[leaderboard] submitted score {} for player {player_id}", entry.total_score);
        Ok(entry)
    }

    /// Reads every stored score, ranks it by `mode`/`window`, and returns
    /// the requested page. O(n) over total submissions; acceptable at the
    /// single-instance scale this server targets.
    pub async fn query_leaderboard(
        &self,
        difficulty: dice_core::Difficulty,
        window: Window,
        mode: Mode,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<LeaderboardRow>, LeaderboardError> {
        let keys = self.store.list_keys(SCORES_SECTION, "").await?;
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(doc) = self.store.get(SCORES_SECTION, &key).await? {
                let entry: ScoreEntry = serde_json::from_value(doc).map_err(|e| LeaderboardError::Decode(e.to_string()))?;
                entries.push(entry);
            }
        }
        let cutoff = window.cutoff(SystemTime::now());
        let rows = leaderboard::rank(&entries, difficulty, cutoff, mode);
        Ok(rows.into_iter().skip(offset).take(limit.max(1)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_core::Difficulty;
    use dice_store::FileStore;

    #[tokio::test]
    async fn submit_score_then_query_ranks_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let service = LeaderboardService::new(store);
        let player = Uuid::new_v4();
        service
            .submit_score(
                player,
                ScoreSubmission {
                    session_id: Uuid::new_v4(),
                    difficulty: Difficulty::Normal,
                    total_score: 42,
                    busts: 0,
                    rolls_taken: 3,
                },
            )
            .await
            .unwrap();
        let rows = service
            .query_leaderboard(Difficulty::Normal, Window::AllTime, Mode::BestScore, 0, 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, player);
        assert_eq!(rows[0].best_score, 42);
    }

    #[tokio::test]
    async fn resubmitting_same_session_and_player_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let service = LeaderboardService::new(store);
        let player = Uuid::new_v4();
        let session = Uuid::new_v4();
        for score in [30, 30] {
            service
                .submit_score(
                    player,
                    ScoreSubmission {
                        session_id: session,
                        difficulty: Difficulty::Normal,
                        total_score: score,
                        busts: 0,
                        rolls_taken: 2,
                    },
                )
                .await
                .unwrap();
        }
        let rows = service
            .query_leaderboard(Difficulty::Normal, Window::AllTime, Mode::BestScore, 0, 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matches_played, 1);
    }

    #[tokio::test]
    async fn settings_write_rejected_for_anonymous_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let service = LeaderboardService::new(store);
        let player = Uuid::new_v4();
        service.get_profile_or_create(player, "Lurker").await.unwrap();
        let result = service
            .upsert_profile(player, None, Some(serde_json::json!({"theme": "dark"})))
            .await;
        assert!(matches!(result, Err(LeaderboardError::SettingsRequireFederatedIdentity)));
    }
}
