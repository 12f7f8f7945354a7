use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::MoviePreferences,
    routes::AppState,
    services::preferences,
};

#[derive(Debug, Deserialize)]
pub struct PreferencesQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Handler for the per-user preference listing.
///
/// Returns every rating bucket keyed by its display label, each mapped to
/// an ordered list of titles; buckets are present even when empty.
pub async fn movie_preferences(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreferencesQuery>,
) -> AppResult<Json<MoviePreferences>> {
    let user_id = params
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("Missing userId query parameter".to_string()))?
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput("userId must be an integer".to_string()))?;

    let preferences = preferences::preferences_for_user(state.store.as_ref(), user_id).await?;
    Ok(Json(preferences))
}
