use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::models::{Event, EventForm, EventId, EventTable, Game, Team, TeamRef, TeamWithPlayers};

#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub teams: Vec<TeamWithPlayers>,
    pub games: Vec<Game>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<EventListResponse>, ApiError> {
    let events = state.store.list_events().await?;

    let pagination = Pagination::new(params.page, params.page_size);

    Ok(Json(EventListResponse {
        events: pagination.slice(&events).to_vec(),
        pagination: PaginationMeta::new(&pagination, events.len()),
    }))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.store.create_event(&form.validate()?).await?;
    info!(event_id = %event.id, name = %event.name, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Load an event or fail with 404.
pub(crate) async fn require_event(state: &AppState, id: EventId) -> Result<Event, ApiError> {
    state
        .store
        .get_event(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event not found: {}", id)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<EventDetail>, ApiError> {
    let event = require_event(&state, id).await?;

    let mut teams = Vec::new();
    for team in state.store.teams_for_event(id).await? {
        let players = state.store.players_for_team(team.id).await?;
        teams.push(TeamWithPlayers { team, players });
    }
    let games = state.store.games_for_event(id).await?;

    Ok(Json(EventDetail {
        event,
        teams,
        games,
    }))
}

/// Teams of an event by name, for pickers.
pub async fn team_options(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Vec<TeamRef>>, ApiError> {
    require_event(&state, id).await?;
    let teams: Vec<Team> = state.store.teams_for_event(id).await?;
    Ok(Json(teams.iter().map(TeamRef::from).collect()))
}

pub async fn event_games(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<Vec<Game>>, ApiError> {
    require_event(&state, id).await?;
    Ok(Json(state.store.games_for_event(id).await?))
}

pub async fn standings(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<EventTable>, ApiError> {
    Ok(Json(state.engine.event_table(id).await?))
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_and_get_event() {
        let app = test_app();
        let (status, created) = post_json(
            app.clone(),
            "/api/events",
            r#"{"name":"  Spring Cup ","date":"2025-04-15","event_url":"https://example.com/spring"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Spring Cup");
        assert_eq!(created["date"], "2025-04-15");

        let id = created["id"].as_i64().unwrap();
        let (status, detail) = get_json(app, &format!("/api/events/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["name"], "Spring Cup");
        assert_eq!(detail["teams"].as_array().unwrap().len(), 0);
        assert_eq!(detail["games"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_event_validation() {
        let app = test_app();
        let (status, json) = post_json(
            app.clone(),
            "/api/events",
            r#"{"name":"","date":"2025-04-15","event_url":"https://example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");

        let (status, _) = post_json(
            app.clone(),
            "/api/events",
            r#"{"name":"Cup","date":"15/04/2025","event_url":"https://example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            app,
            "/api/events",
            r#"{"name":"Cup","date":"2025-04-15","event_url":"not a url"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_events_newest_first() {
        let app = test_app();
        for name in ["First", "Second"] {
            post_json(
                app.clone(),
                "/api/events",
                &format!(
                    r#"{{"name":"{}","date":"2025-04-15","event_url":"https://example.com"}}"#,
                    name
                ),
            )
            .await;
        }

        let (status, json) = get_json(app, "/api/events").await;
        assert_eq!(status, StatusCode::OK);
        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["name"], "Second");
        assert_eq!(json["pagination"]["total_items"], 2);
    }

    #[tokio::test]
    async fn test_list_events_past_last_page() {
        let app = test_app();
        post_json(
            app.clone(),
            "/api/events",
            r#"{"name":"Cup","date":"2025-04-15","event_url":"https://example.com"}"#,
        )
        .await;

        let (status, json) = get_json(app, "/api/events?page=4294967295&page_size=100").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["events"].as_array().unwrap().is_empty());
        assert_eq!(json["pagination"]["total_items"], 1);
        assert_eq!(json["pagination"]["has_next"], false);
    }

    #[tokio::test]
    async fn test_missing_event_is_404() {
        let app = test_app();
        let (status, json) = get_json(app.clone(), "/api/events/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");

        let (status, _) = get_json(app, "/api/events/42/standings").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_team_options_sorted_by_name() {
        let app = test_app();
        let (event_id, _, _) = seed_fixture(&app).await;

        let (status, json) = get_json(app, &format!("/api/events/{}/teams", event_id)).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Blue", "Red"]);
    }

    #[tokio::test]
    async fn test_standings_after_goals() {
        let app = test_app();
        let (event_id, red, blue) = seed_fixture(&app).await;
        let (_, player) = post_json(
            app.clone(),
            "/api/players",
            &format!(r#"{{"name":"Ivan","team_id":{}}}"#, red),
        )
        .await;
        let (_, game) = post_json(
            app.clone(),
            "/api/games",
            &format!(
                r#"{{"event_id":{},"home_team_id":{},"away_team_id":{}}}"#,
                event_id, red, blue
            ),
        )
        .await;
        let (status, _) = post_json(
            app.clone(),
            &format!("/api/games/{}/goals", game["id"]),
            &format!(r#"{{"player_id":{},"team_id":{},"minute":12}}"#, player["id"], red),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, table) = get_json(app, &format!("/api/events/{}/standings", event_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(table["standings"][0]["team"]["name"], "Red");
        assert_eq!(table["standings"][0]["points"], 3);
        assert_eq!(table["standings"][1]["losses"], 1);
        assert_eq!(table["top_scorers"][0]["player"], "Ivan");
        assert_eq!(table["top_scorers"][0]["count"], 1);
        assert_eq!(table["top_assists"].as_array().unwrap().len(), 0);
    }
}
