use axum::{extract::State, Json};

use crate::{
    error::AppResult, models::DiscoverResponse, services::orchestrator::Orchestrator,
};

use super::AppState;

/// Handler for the discovery endpoint
///
/// Takes no body; the taste profile is derived from stored state.
pub async fn discover(State(state): State<AppState>) -> AppResult<Json<DiscoverResponse>> {
    let orchestrator = Orchestrator::new(
        state.store.clone(),
        state.discovery.clone(),
        state.catalog.clone(),
        state.settings.clone(),
    );

    let response = orchestrator.discover().await?;
    Ok(Json(response))
}
