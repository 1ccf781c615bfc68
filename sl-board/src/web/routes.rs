//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::engine::SiteStatus;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sites", get(list_sites))
        .route("/boards", get(list_boards))
        .route("/boards/:name", get(get_board))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fetch and health status of every site.
async fn list_sites(State(state): State<AppState>) -> Json<Vec<SiteStatus>> {
    Json(state.boards.sites().await)
}

async fn list_boards(State(state): State<AppState>) -> Json<BoardsResponse> {
    let boards = state
        .boards
        .boards()
        .await
        .iter()
        .map(|b| BoardResponse::from_published(b, None))
        .collect();

    Json(BoardsResponse { boards })
}

/// One board by group name.
async fn get_board(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardResponse>, AppError> {
    let board = state
        .boards
        .board(&name)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("No board named {name:?}"),
        })?;

    Ok(Json(BoardResponse::from_published(&board, query.limit)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        tracing::debug!(%status, "{message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::Local;
    use tower::ServiceExt;

    use crate::domain::{Board, BoardEntry, SiteId, TransportMode};
    use crate::engine::{BoardTable, GateStatus, PublishedBoard};
    use crate::fetch::HealthState;

    fn site() -> SiteId {
        SiteId::parse("9192").unwrap()
    }

    fn entry(line: &str, text: &str, minutes: u32) -> BoardEntry {
        BoardEntry {
            mode: TransportMode::Metro,
            line: line.into(),
            destination: "Mörby centrum".into(),
            direction: 1,
            departure_text: text.into(),
            minutes_until: minutes,
            deviations: String::new(),
        }
    }

    async fn app() -> Router {
        let table = BoardTable::new();
        let status = SiteStatus {
            site: site(),
            gate: GateStatus::Enabled,
            health: HealthState::Healthy,
            consecutive_failures: 0,
            degraded_since: None,
            last_fetch_at: Some(Local::now()),
            last_success_at: Some(Local::now()),
            last_error: None,
            departures: 3,
            groups: vec!["north".into(), "south".into()],
        };
        let boards = vec![
            PublishedBoard {
                name: "north".into(),
                site: site(),
                board: Board::from_entries(vec![
                    entry("14", "3 min", 3),
                    entry("13", "Nu", 0),
                    entry("14", "14:12", 12),
                ]),
                updated_at: Some(Local::now()),
            },
            PublishedBoard {
                name: "south".into(),
                site: site(),
                board: Board::empty(),
                updated_at: None,
            },
        ];
        table.publish(status, boards).await;

        create_router(AppState::new(table))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn board_by_name() {
        let (status, json) = get_json(app().await, "/boards/north").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "north");
        assert_eq!(json["minutes"], 0);
        assert_eq!(json["count"], 3);
        assert_eq!(json["next_line"], "13");
        assert_eq!(json["upcoming_departure"], "3 min");
        let minutes: Vec<_> = json["departures"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["minutes_until"].as_u64().unwrap())
            .collect();
        assert_eq!(minutes, vec![0, 3, 12]);
    }

    #[tokio::test]
    async fn board_limit() {
        let (status, json) = get_json(app().await, "/boards/north?limit=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 3);
        assert_eq!(json["departures"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_board_is_404() {
        let (status, json) = get_json(app().await, "/boards/west").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("west"));
    }

    #[tokio::test]
    async fn all_boards() {
        let (status, json) = get_json(app().await, "/boards").await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = json["boards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["north", "south"]);
        assert_eq!(json["boards"][1]["minutes"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn sites_status() {
        let (status, json) = get_json(app().await, "/sites").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["site"], "9192");
        assert_eq!(json[0]["health"], "healthy");
        assert_eq!(json[0]["gate"], "enabled");
        assert_eq!(json[0]["departures"], 3);
    }
}
