use actix_web::{web, HttpResponse};
use dice_core::Difficulty;
use dice_leaderboard::{LeaderboardError, Mode, Window};
use dice_store::Store;
use serde::Deserialize;

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    difficulty: Option<Difficulty>,
    mode: Option<String>,
    window: Option<String>,
    #[serde(default)]
    cursor: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn get_leaderboard<S: Store>(
    state: web::Data<AppState<S>>,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let difficulty = query.difficulty.unwrap_or(Difficulty::Normal);
    let mode = match &query.mode {
        Some(raw) => Mode::parse(raw).ok_or_else(|| LeaderboardError::UnknownMode(raw.clone()))?,
        None => Mode::BestScore,
    };
    let window = match &query.window {
        Some(raw) => Window::parse(raw).ok_or_else(|| LeaderboardError::UnknownWindow(raw.clone()))?,
        None => Window::AllTime,
    };
    let offset = query.cursor.unwrap_or(0);
    let limit = query.limit.unwrap_or(20).clamp(1, 200);
    let rows = state.leaderboard.query_leaderboard(difficulty, window, mode, offset, limit).await?;
    let next_cursor = if rows.len() == limit { Some(offset + limit) } else { None };
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": rows,
        "nextCursor": next_cursor,
    })))
}
