use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieRating, RatedTitle, RatingAction},
};

use super::PreferenceStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed preference store
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the movie or, on a title conflict, returns the existing row.
    ///
    /// The no-op `DO UPDATE` makes the conflicting row visible to
    /// `RETURNING`, which a plain `DO NOTHING` would not.
    async fn upsert_movie(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title: &str,
    ) -> AppResult<Movie> {
        let row = sqlx::query(
            r#"
            INSERT INTO movies (title)
            VALUES ($1)
            ON CONFLICT (title) DO UPDATE SET title = EXCLUDED.title
            RETURNING id, title
            "#,
        )
        .bind(title)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Movie {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
        })
    }

    async fn connect_or_create_user(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: i64,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn record_rating(
        &self,
        user_id: i64,
        title: &str,
        action: RatingAction,
    ) -> AppResult<MovieRating> {
        let mut tx = self.pool.begin().await?;

        let movie = Self::upsert_movie(&mut tx, title).await?;
        Self::connect_or_create_user(&mut tx, user_id).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO movie_ratings (movie_id, user_id, rating, rationale)
            VALUES ($1, $2, $3, '')
            RETURNING id, rationale, created_at
            "#,
        )
        .bind(movie.id)
        .bind(user_id)
        .bind(action.as_db_str())
        .fetch_one(&mut *tx)
        .await?;

        let rating = MovieRating {
            id: row.try_get("id")?,
            movie_id: movie.id,
            user_id,
            rating: action,
            rationale: row.try_get("rationale")?,
            created_at: row.try_get("created_at")?,
        };

        tx.commit().await?;

        tracing::info!(
            user_id,
            movie_id = movie.id,
            rating = action.as_db_str(),
            "Rating recorded"
        );

        Ok(rating)
    }

    async fn ratings_for_user(&self, user_id: i64) -> AppResult<Vec<RatedTitle>> {
        let rows = sqlx::query(
            r#"
            SELECT r.rating, m.title
            FROM movie_ratings r
            JOIN movies m ON m.id = r.movie_id
            WHERE r.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let rating: String = row.try_get("rating")?;
                let action = RatingAction::from_db_str(&rating).ok_or_else(|| {
                    AppError::Internal(format!("Unknown rating value in store: {}", rating))
                })?;

                Ok(RatedTitle {
                    action,
                    title: row.try_get("title")?,
                })
            })
            .collect()
    }
}
