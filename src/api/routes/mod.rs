pub mod events;
pub mod games;
pub mod players;
pub mod teams;

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::storage::InMemoryStore;

    pub fn test_app() -> axum::Router {
        build_router(AppState::new(Arc::new(InMemoryStore::new())))
    }

    pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn delete(app: axum::Router, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    /// Create an event with two teams, returning `(event, home, away)` ids.
    pub async fn seed_fixture(app: &axum::Router) -> (i64, i64, i64) {
        let (_, event) = post_json(
            app.clone(),
            "/api/events",
            r#"{"name":"Spring Cup","date":"2025-04-15","event_url":"https://example.com/spring"}"#,
        )
        .await;
        let event_id = event["id"].as_i64().unwrap();

        let mut team_ids = Vec::new();
        for name in ["Red", "Blue"] {
            let (_, team) = post_json(
                app.clone(),
                "/api/teams",
                &format!(r#"{{"name":"{}","event_id":{}}}"#, name, event_id),
            )
            .await;
            team_ids.push(team["id"].as_i64().unwrap());
        }
        (event_id, team_ids[0], team_ids[1])
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (status, json) = get_json(test_app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = get_json(test_app(), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
