use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::Metrics;
use crate::store::StatsState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl From<&StatsState> for StatsResponse {
    fn from(state: &StatsState) -> Self {
        let mut response = StatsResponse {
            status: state.status(),
            id: state.id().map(|id| id.to_string()),
            fetched_at: None,
            error: None,
            metrics: None,
        };
        match state {
            StatsState::Ready {
                metrics,
                fetched_at,
                ..
            } => {
                response.metrics = Some(Metrics::clone(metrics));
                response.fetched_at = Some(*fetched_at);
            }
            StatsState::Failed { error, .. } => response.error = Some(error.clone()),
            StatsState::Absent | StatsState::Loading { .. } => {}
        }
        response
    }
}

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

/// Whatever the store currently shows.
pub async fn current(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(&state.store.current()))
}

/// Drop the cached result for the selected player and fetch again.
pub async fn reload(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    if state.store.identifier().await.is_none() {
        return Err(ApiError::BadRequest("No player identifier is set".into()));
    }
    let current = state.store.reload().await;
    Ok(Json(StatsResponse::from(&current)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use tempfile::TempDir;

    use crate::api::test_support::{app, request};
    use crate::models::Snapshot;
    use crate::source::MockSource;
    use crate::PlayerId;

    fn snapshot() -> Snapshot {
        Snapshot {
            matches: 4,
            rank1: 1,
            rank2: 1,
            rank3: 1,
            rank4: 1,
            rounds: 40,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir, Arc::new(MockSource::new())).await;

        let (status, body) = request(app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_stats_absent() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir, Arc::new(MockSource::new())).await;

        let (status, body) = request(app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "absent");
        assert!(body.get("metrics").is_none());
    }

    #[tokio::test]
    async fn test_stats_ready() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new().with_snapshot("Rikaka", snapshot()));
        let (app, store) = app(&dir, source).await;

        store.select(PlayerId::parse("Rikaka").unwrap()).await.unwrap();
        store.settled().await;

        let (status, body) = request(app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["id"], "Rikaka");
        assert!(body["fetchedAt"].is_string());
        assert_eq!(body["metrics"]["basic"][0]["matches"], 4);
        assert_eq!(body["metrics"]["basic"][1]["rank1Rate"], "25.00%");
        assert_eq!(body["metrics"]["riichi"][1]["riichWinRate"], "n/a");
    }

    #[tokio::test]
    async fn test_stats_failed() {
        let dir = TempDir::new().unwrap();
        let (app, store) = app(&dir, Arc::new(MockSource::new())).await;

        store.select(PlayerId::parse("ghost").unwrap()).await.unwrap();
        store.settled().await;

        let (_, body) = request(app, "GET", "/api/stats", None).await;
        assert_eq!(body["status"], "failed");
        assert!(body["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_reload_requires_identifier() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir, Arc::new(MockSource::new())).await;

        let (status, body) = request(app, "POST", "/api/stats/reload", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_reload_refetches() {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(MockSource::new().with_snapshot("Rikaka", snapshot()));
        let (app, store) = app(&dir, source.clone()).await;

        store.select(PlayerId::parse("Rikaka").unwrap()).await.unwrap();
        store.settled().await;

        let (status, _) = request(app, "POST", "/api/stats/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        store.settled().await;
        assert_eq!(source.calls(), 2);
    }
}
