use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub content_id: i64,
    pub score: i32,
}

/// Sets the current rating for an item; latest write wins
pub async fn rate(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> AppResult<StatusCode> {
    if !(1..=5).contains(&request.score) {
        return Err(AppError::InvalidInput(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    if state.store.is_connected() && state.store.get_item(request.content_id).await.is_none() {
        return Err(AppError::NotFound(format!(
            "content item {}",
            request.content_id
        )));
    }

    state
        .store
        .upsert_rating(request.content_id, request.score)
        .await?;

    Ok(StatusCode::OK)
}
