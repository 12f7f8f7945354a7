use crate::{
    error::AppResult,
    models::{MovieRating, RatedTitle, RatingAction},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryPreferenceStore;
pub use postgres::{create_pool, PgPreferenceStore};

/// Persistence seam for movies and their per-user ratings.
///
/// The store owns three operations: upsert-movie-by-title, insert-rating,
/// and list-ratings-by-user. The first two are exposed as a single
/// transactional `record_rating` so a failure between them cannot leave a
/// movie row with no rating.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Upserts the movie by title, connects-or-creates the user, and inserts
    /// one rating row, all in a single transaction.
    ///
    /// Rating the same title twice never duplicates the movie row; it does
    /// add a second rating row.
    async fn record_rating(
        &self,
        user_id: i64,
        title: &str,
        action: RatingAction,
    ) -> AppResult<MovieRating>;

    /// Lists the user's ratings joined with their movie titles, oldest first.
    ///
    /// An unknown user simply has no ratings; this is not an error.
    async fn ratings_for_user(&self, user_id: i64) -> AppResult<Vec<RatedTitle>>;
}
