use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Event, EventId, Game, GameForm, GameId, GoalForm, GoalRow, Team, TeamId};
use crate::scoresheet::GameSheet;

use super::events::require_event;

#[derive(Debug, Serialize)]
pub struct GameDetail {
    #[serde(flatten)]
    pub game: Game,
    pub event: Event,
    pub home_team: Team,
    pub away_team: Team,
    pub goals: Vec<GoalRow>,
}

/// A team referenced by a game must exist and play in the game's event.
async fn team_in_event(state: &AppState, event_id: EventId, id: TeamId) -> Result<Team, ApiError> {
    match state.store.get_team(id).await? {
        Some(team) if team.event_id == event_id => Ok(team),
        Some(_) => {
            warn!(team_id = %id, event_id = %event_id, "Team belongs to another event");
            Err(ApiError::BadRequest(format!(
                "Team {} does not belong to event {}",
                id, event_id
            )))
        }
        None => Err(ApiError::BadRequest(format!("Team does not exist: {}", id))),
    }
}

pub async fn create_game(
    State(state): State<AppState>,
    Json(form): Json<GameForm>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let game = form.validate()?;
    if state.store.get_event(game.event_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!(
            "Event does not exist: {}",
            game.event_id
        )));
    }
    for team_id in [game.home_team_id, game.away_team_id] {
        team_in_event(&state, game.event_id, team_id).await?;
    }

    let game = state.store.create_game(&game).await?;
    info!(
        game_id = %game.id,
        event_id = %game.event_id,
        home = %game.home_team_id,
        away = %game.away_team_id,
        "Game created"
    );
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> Result<Json<GameDetail>, ApiError> {
    let game = state
        .store
        .get_game(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Game not found: {}", id)))?;

    let event = require_event(&state, game.event_id).await?;
    let home_team = team_in_event(&state, game.event_id, game.home_team_id).await?;
    let away_team = team_in_event(&state, game.event_id, game.away_team_id).await?;
    let goals = state.scoresheet.goal_rows(&game).await?;

    Ok(Json(GameDetail {
        game,
        event,
        home_team,
        away_team,
        goals,
    }))
}

pub async fn record_goal(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Json(form): Json<GoalForm>,
) -> Result<(StatusCode, Json<GameSheet>), ApiError> {
    let sheet = state.scoresheet.record_goal(id, form).await?;
    Ok((StatusCode::CREATED, Json(sheet)))
}
