use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::RecommendationResponse,
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

fn default_temperature() -> f32 {
    0.5
}

/// Handler for the recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        model = %request.model,
        "Processing recommendation request"
    );

    let response = recommendations::recommend_for_user(
        state.store.as_ref(),
        state.chat.as_ref(),
        request.user_id,
        request.model,
        request.temperature,
        request.api_key,
    )
    .await?;

    Ok(Json(response))
}
