use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Preferences,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub recommendations_per_type: i32,
    pub watch_region: String,
}

pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.store.preferences().await)
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> AppResult<StatusCode> {
    if request.recommendations_per_type < 1 {
        return Err(AppError::InvalidInput(
            "recommendations_per_type must be at least 1".to_string(),
        ));
    }
    if request.watch_region.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "watch_region must not be empty".to_string(),
        ));
    }

    state
        .store
        .save_preferences(&Preferences {
            recommendations_per_type: request.recommendations_per_type,
            watch_region: request.watch_region.trim().to_uppercase(),
        })
        .await?;

    Ok(StatusCode::OK)
}
