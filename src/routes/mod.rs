use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::Store,
    middleware::request_id::{make_span, request_id_middleware},
    services::{
        catalog::CatalogProvider, discovery::DiscoveryBackend, orchestrator::DiscoverySettings,
    },
};

pub mod discover;
pub mod library;
pub mod preferences;
pub mod ratings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub discovery: Arc<dyn DiscoveryBackend>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub settings: DiscoverySettings,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/discover", post(discover::discover))
        .route("/library", get(library::list_library))
        .route("/items", get(library::list_items))
        .route("/items", post(library::create_item))
        .route("/items/:id/library", post(library::save_to_library))
        .route("/items/:id/library", axum::routing::delete(library::remove_from_library))
        .route("/items/:id/watched", post(library::mark_watched))
        .route("/ratings", post(ratings::rate))
        .route("/preferences", get(preferences::get_preferences))
        .route("/preferences", put(preferences::update_preferences))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
