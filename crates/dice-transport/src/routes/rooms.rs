use actix_web::{web, HttpResponse};
use dice_auth::Identity;
use dice_core::{Difficulty, TurnMode, Visibility};
use dice_rooms::{NewRoom, Paging, RoomFilter};
use dice_store::Store;
use serde::Deserialize;

use crate::routes::room_view;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ListRoomsQuery {
    difficulty: Option<Difficulty>,
    #[serde(rename = "minPlayers")]
    min_players: Option<u8>,
    q: Option<String>,
    #[serde(default)]
    cursor: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn list_rooms<S: Store>(state: web::Data<AppState<S>>, query: web::Query<ListRoomsQuery>) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let filter = RoomFilter {
        difficulty: query.difficulty,
        min_players: query.min_players,
        query: query.q,
    };
    let paging = Paging {
        cursor: query.cursor.unwrap_or(0),
        limit: query.limit.unwrap_or(0),
    };
    let page = state.rooms.list_rooms(&filter, paging).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "items": page.items.iter().map(room_view).collect::<Vec<_>>(),
        "nextCursor": page.next_cursor,
    })))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomBody {
    name: String,
    difficulty: Difficulty,
    #[serde(default)]
    visibility: Option<Visibility>,
    #[serde(default)]
    max_players: Option<u8>,
    #[serde(default)]
    turn_mode: Option<TurnMode>,
}

pub async fn create_room<S: Store>(state: web::Data<AppState<S>>, body: web::Json<CreateRoomBody>) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let room = state
        .rooms
        .create_room(NewRoom {
            name: body.name,
            difficulty: body.difficulty,
            visibility: body.visibility.unwrap_or(Visibility::Public),
            max_players: body.max_players.unwrap_or(4),
            turn_mode: body.turn_mode.unwrap_or(TurnMode::RollByRoll),
        })
        .await;
    Ok(HttpResponse::Ok().json(room_view(&room)))
}

pub async fn join_by_code<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<String>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let caller = identity.user().player_id().inner();
    let room = state.rooms.join_by_code(&code, caller).await?;
    Ok(HttpResponse::Ok().json(room_view(&room)))
}
