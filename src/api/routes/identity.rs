use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::PlayerId;

use super::stats::StatsResponse;

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: String,
}

pub async fn show(State(state): State<AppState>) -> Json<IdentityResponse> {
    let id = state.store.identifier().await;
    Json(IdentityResponse {
        id: id.map(|id| id.to_string()),
    })
}

/// Select a player. Blank names are rejected; the stats load in the background.
pub async fn select(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<StatsResponse>, ApiError> {
    let id = PlayerId::parse(&request.id)
        .ok_or_else(|| ApiError::BadRequest("Player identifier must not be blank".into()))?;

    let current = state.store.select(id).await?;
    Ok(Json(StatsResponse::from(&current)))
}

pub async fn clear(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The source's guess at the local player; does not select it.
pub async fn guess(State(state): State<AppState>) -> Result<Json<IdentityResponse>, ApiError> {
    let id = state.store.guess_identifier().await?;
    Ok(Json(IdentityResponse {
        id: id.map(|id| id.to_string()),
    }))
}
