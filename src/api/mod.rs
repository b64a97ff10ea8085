//! REST API endpoints.
//!
//! Axum-based JSON API for managing events, teams, players and games, and
//! for querying an event's standings and leaderboards.

pub mod routes;
pub mod state;

use std::path::Path;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::calculate::EngineError;
use crate::models::ValidationError;
use crate::scoresheet::ScoresheetError;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StorageError::Conflict(msg) => ApiError::Conflict(msg),
            StorageError::Database(_) | StorageError::Corrupt(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EventNotFound(id) => ApiError::NotFound(format!("Event not found: {}", id)),
            EngineError::Storage(e) => e.into(),
            EngineError::Integrity(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ScoresheetError> for ApiError {
    fn from(err: ScoresheetError) -> Self {
        match err {
            ScoresheetError::GameNotFound(_) => ApiError::NotFound(err.to_string()),
            ScoresheetError::ScorerRequired | ScoresheetError::ScorerNotFound(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ScoresheetError::Dangling { .. } => ApiError::Internal(err.to_string()),
            ScoresheetError::Storage(e) => e.into(),
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page window over a list endpoint. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Index of the first item on this page. Saturates for absurd pages.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// The items on this page; empty past the end.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let end = start.saturating_add(self.page_size as usize).min(items.len());
        &items[start..end]
    }
}

/// Page position returned next to a list.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: usize) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size as usize);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: (pagination.page as usize) < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = match state.cors_origin.as_deref() {
        None | Some("*") => CorsLayer::new().allow_origin(Any),
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new().allow_origin(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                CorsLayer::new()
            }
        },
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/health", get(routes::health))
        .route(
            "/api/events",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route("/api/events/:id", get(routes::events::get_event))
        .route("/api/events/:id/teams", get(routes::events::team_options))
        .route("/api/events/:id/games", get(routes::events::event_games))
        .route("/api/events/:id/standings", get(routes::events::standings))
        .route("/api/teams", post(routes::teams::create_team))
        .route(
            "/api/teams/:id",
            get(routes::teams::get_team).delete(routes::teams::delete_team),
        )
        .route("/api/players", post(routes::players::create_player))
        .route(
            "/api/players/:id",
            get(routes::players::get_player).delete(routes::players::delete_player),
        )
        .route("/api/games", post(routes::games::create_game))
        .route("/api/games/:id", get(routes::games::get_game))
        .route("/api/games/:id/goals", post(routes::games::record_goal));

    if let Some(dir) = state.static_dir.as_deref().filter(|d| Path::new(d).is_dir()) {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_default() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 50);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_bounds() {
        // Page can't be 0
        let p = Pagination::new(Some(0), Some(50));
        assert_eq!(p.page, 1);

        // Page size max is 100
        let p = Pagination::new(Some(1), Some(200));
        assert_eq!(p.page_size, 100);
    }

    #[test]
    fn test_pagination_slice() {
        let items: Vec<u32> = (1..=25).collect();

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.slice(&items), &[21, 22, 23, 24, 25]);

        let p = Pagination::new(Some(4), Some(10));
        assert!(p.slice(&items).is_empty());
    }

    #[test]
    fn test_pagination_huge_page() {
        let p = Pagination::new(Some(u32::MAX), None);
        assert_eq!(p.page, u32::MAX);
        assert!(p.offset() >= (u32::MAX as usize - 1));

        let items: Vec<u32> = (1..=5).collect();
        assert!(p.slice(&items).is_empty());

        let meta = PaginationMeta::new(&p, items.len());
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_pagination_meta() {
        let p = Pagination::new(Some(2), Some(10));
        let meta = PaginationMeta::new(&p, 25);

        assert_eq!(meta.page, 2);
        assert_eq!(meta.total_items, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::Conflict("dup".to_string()).into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = StorageError::NotFound {
            entity: "Team",
            id: 1,
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::Conflict("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
