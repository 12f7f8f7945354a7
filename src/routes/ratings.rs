use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::RatingAction,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RateMovieRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieTitle")]
    pub movie_title: String,
    pub action: RatingAction,
}

/// Handler for recording a rating.
///
/// Upserts the movie by title, connects-or-creates the user, and inserts
/// the rating in one transaction.
pub async fn rate_movie(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RateMovieRequest>,
) -> AppResult<Json<Value>> {
    if request.movie_title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Movie title cannot be empty".to_string(),
        ));
    }

    let rating = state
        .store
        .record_rating(request.user_id, &request.movie_title, request.action)
        .await?;

    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        movie_id = rating.movie_id,
        action = request.action.label(),
        "Movie rated"
    );

    Ok(Json(json!({ "success": true })))
}
