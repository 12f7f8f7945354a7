use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Movie, MovieRating, RatedTitle, RatingAction},
};

use super::PreferenceStore;

#[derive(Default)]
struct MemoryState {
    movies: Vec<Movie>,
    ratings: Vec<MovieRating>,
}

/// In-memory preference store with the same semantics as the PostgreSQL
/// implementation: unique movie titles, insert-only ratings.
///
/// Used by tests and useful for running the API without a database.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    inner: RwLock<MemoryState>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct movie rows
    pub async fn movie_count(&self) -> usize {
        self.inner.read().await.movies.len()
    }

    /// Number of rating rows
    pub async fn rating_count(&self) -> usize {
        self.inner.read().await.ratings.len()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn record_rating(
        &self,
        user_id: i64,
        title: &str,
        action: RatingAction,
    ) -> AppResult<MovieRating> {
        let mut state = self.inner.write().await;

        let movie_id = match state.movies.iter().find(|m| m.title == title) {
            Some(movie) => movie.id,
            None => {
                let id = state.movies.len() as i64 + 1;
                state.movies.push(Movie {
                    id,
                    title: title.to_string(),
                });
                id
            }
        };

        let rating = MovieRating {
            id: state.ratings.len() as i64 + 1,
            movie_id,
            user_id,
            rating: action,
            rationale: String::new(),
            created_at: Utc::now(),
        };
        state.ratings.push(rating.clone());

        Ok(rating)
    }

    async fn ratings_for_user(&self, user_id: i64) -> AppResult<Vec<RatedTitle>> {
        let state = self.inner.read().await;

        Ok(state
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| {
                let title = state
                    .movies
                    .iter()
                    .find(|m| m.id == r.movie_id)
                    .map(|m| m.title.clone())
                    .unwrap_or_default();
                RatedTitle {
                    action: r.rating,
                    title,
                }
            })
            .collect())
    }
}
