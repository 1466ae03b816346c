use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    db::NewItem,
    error::{AppError, AppResult},
    models::{ContentItem, ContentKind},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub title: String,
    pub kind: ContentKind,
    pub stream_url: Option<String>,
    pub overview: Option<String>,
    pub release_year: Option<i32>,
    pub genre: Option<String>,
}

/// Items the user saved to their library
pub async fn list_library(State(state): State<AppState>) -> Json<Vec<ContentItem>> {
    Json(state.store.library_items().await)
}

/// All items known to the system
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<ContentItem>> {
    Json(state.store.all_items().await)
}

/// Manually adds a content item
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ContentItem>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }

    let item = state
        .store
        .insert_manual_item(NewItem {
            title: request.title.trim().to_string(),
            kind: request.kind,
            stream_url: request.stream_url,
            overview: request.overview,
            release_year: request.release_year,
            genre: request.genre,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Promotes an item to library membership
pub async fn save_to_library(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.store.set_library(id, true).await? {
        return Err(AppError::NotFound(format!("content item {id}")));
    }
    Ok(StatusCode::OK)
}

/// Clears library membership; the row itself is kept
pub async fn remove_from_library(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.store.set_library(id, false).await? {
        return Err(AppError::NotFound(format!("content item {id}")));
    }
    Ok(StatusCode::OK)
}

/// Records a watch: bumps the count and stamps the time
pub async fn mark_watched(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.store.mark_watched(id).await? {
        return Err(AppError::NotFound(format!("content item {id}")));
    }
    Ok(StatusCode::OK)
}
