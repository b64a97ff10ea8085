use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Player, PlayerForm, PlayerId};

pub async fn create_player(
    State(state): State<AppState>,
    Json(form): Json<PlayerForm>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = form.validate()?;
    if state.store.get_team(player.team_id).await?.is_none() {
        warn!(team_id = %player.team_id, "Rejected player for unknown team");
        return Err(ApiError::BadRequest(format!(
            "Team does not exist: {}",
            player.team_id
        )));
    }

    let player = state.store.create_player(&player).await?;
    info!(player_id = %player.id, team_id = %player.team_id, "Player created");
    Ok((StatusCode::CREATED, Json(player)))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<PlayerId>,
) -> Result<Json<Player>, ApiError> {
    state
        .store
        .get_player(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Player not found: {}", id)))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<PlayerId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_player(id).await?;
    info!(player_id = %id, "Player deleted");
    Ok(StatusCode::NO_CONTENT)
}
