use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PosterQuery {
    title: String,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    /// Full image URL, or null when no poster exists for the title
    pub poster: Option<String>,
}

/// Handler for the poster lookup endpoint
pub async fn poster(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PosterQuery>,
) -> AppResult<Json<PosterResponse>> {
    let provider = state.posters.as_ref().ok_or_else(|| {
        AppError::ExternalApi("Poster lookup is not configured (TMDB_API_KEY unset)".to_string())
    })?;

    let poster = provider.poster_url(&params.title).await?;
    Ok(Json(PosterResponse { poster }))
}
