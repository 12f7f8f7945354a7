use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::PreferenceStore,
    middleware::request_id_middleware,
    services::providers::{ChatProvider, TmdbProvider},
};

pub mod chat;
pub mod posters;
pub mod preferences;
pub mod ratings;
pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn PreferenceStore>,
    pub chat: Arc<dyn ChatProvider>,
    /// Absent when no TMDB key is configured
    pub posters: Option<Arc<TmdbProvider>>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Streaming relay
        .route("/chat", post(chat::chat))
        // Preference store
        .route("/rate-movie", post(ratings::rate_movie))
        .route("/movie-preferences", get(preferences::movie_preferences))
        // Recommendations
        .route("/recommendations", post(recommendations::recommend))
        // Poster lookup
        .route("/poster", get(posters::poster))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
