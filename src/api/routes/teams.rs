use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Team, TeamForm, TeamId, TeamWithPlayers};

pub async fn create_team(
    State(state): State<AppState>,
    Json(form): Json<TeamForm>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = form.validate()?;
    if state.store.get_event(team.event_id).await?.is_none() {
        warn!(event_id = %team.event_id, "Rejected team for unknown event");
        return Err(ApiError::BadRequest(format!(
            "Event does not exist: {}",
            team.event_id
        )));
    }

    let team = state.store.create_team(&team).await?;
    info!(team_id = %team.id, event_id = %team.event_id, name = %team.name, "Team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// Load a team or fail with 404.
pub(crate) async fn require_team(state: &AppState, id: TeamId) -> Result<Team, ApiError> {
    state
        .store
        .get_team(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Team not found: {}", id)))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
) -> Result<Json<TeamWithPlayers>, ApiError> {
    let team = require_team(&state, id).await?;
    let players = state.store.players_for_team(id).await?;
    Ok(Json(TeamWithPlayers { team, players }))
}

/// Removes a team and its roster. A team that still plays in a game is a 409.
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_team(id).await?;
    info!(team_id = %id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_duplicate_team_is_conflict() {
        let app = test_app();
        let (event_id, _, _) = seed_fixture(&app).await;

        let (status, json) = post_json(
            app,
            "/api/teams",
            &format!(r#"{{"name":"Red","event_id":{}}}"#, event_id),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_team_requires_existing_event() {
        let (status, _) = post_json(test_app(), "/api/teams", r#"{"name":"Red","event_id":99}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_team_requires_name() {
        let app = test_app();
        let (event_id, _, _) = seed_fixture(&app).await;
        let (status, json) = post_json(
            app,
            "/api/teams",
            &format!(r#"{{"name":"   ","event_id":{}}}"#, event_id),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["message"], "Bad request: name is required");
    }

    #[tokio::test]
    async fn test_get_team_with_players() {
        let app = test_app();
        let (_, red, _) = seed_fixture(&app).await;
        for name in ["Ivan", "Oleg"] {
            let (status, _) = post_json(
                app.clone(),
                "/api/players",
                &format!(r#"{{"name":"{}","team_id":{}}}"#, name, red),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, json) = get_json(app.clone(), &format!("/api/teams/{}", red)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Red");
        assert_eq!(json["players"].as_array().unwrap().len(), 2);

        let (status, _) = get_json(app, "/api/teams/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_team() {
        let app = test_app();
        let (event_id, red, blue) = seed_fixture(&app).await;
        post_json(
            app.clone(),
            "/api/players",
            &format!(r#"{{"name":"Ivan","team_id":{}}}"#, blue),
        )
        .await;

        let uri = format!("/api/teams/{}", blue);
        assert_eq!(delete(app.clone(), &uri).await, StatusCode::NO_CONTENT);
        let (status, _) = get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(delete(app.clone(), &uri).await, StatusCode::NOT_FOUND);

        let (_, event) = get_json(app.clone(), &format!("/api/events/{}", event_id)).await;
        let teams = event["teams"].as_array().unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0]["id"], red);
    }

    #[tokio::test]
    async fn test_delete_team_with_games_is_conflict() {
        let app = test_app();
        let (event_id, red, blue) = seed_fixture(&app).await;
        let (status, _) = post_json(
            app.clone(),
            "/api/games",
            &format!(
                r#"{{"event_id":{},"home_team_id":{},"away_team_id":{}}}"#,
                event_id, red, blue
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/teams/{}", red);
        assert_eq!(delete(app.clone(), &uri).await, StatusCode::CONFLICT);
        let (status, _) = get_json(app, &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
}
