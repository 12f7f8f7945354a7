use crate::{db::PreferenceStore, error::AppResult, models::MoviePreferences};

/// Aggregates a user's stored ratings into the five preference buckets.
///
/// Every bucket is present in the result even when the user has no ratings
/// at all; titles keep the order their ratings were recorded in.
pub async fn preferences_for_user(
    store: &dyn PreferenceStore,
    user_id: i64,
) -> AppResult<MoviePreferences> {
    let rated = store.ratings_for_user(user_id).await?;

    tracing::debug!(user_id, ratings = rated.len(), "Aggregated movie preferences");

    Ok(rated.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryPreferenceStore, PreferenceStore};
    use crate::models::RatingAction;

    #[tokio::test]
    async fn test_user_without_ratings_gets_all_empty_buckets() {
        let store = MemoryPreferenceStore::new();
        let preferences = preferences_for_user(&store, 1).await.unwrap();
        assert_eq!(preferences, MoviePreferences::default());
    }

    #[tokio::test]
    async fn test_same_title_can_appear_in_two_buckets() {
        let store = MemoryPreferenceStore::new();
        store
            .record_rating(1, "Inception", RatingAction::Like)
            .await
            .unwrap();
        store
            .record_rating(1, "Inception", RatingAction::Interested)
            .await
            .unwrap();

        let preferences = preferences_for_user(&store, 1).await.unwrap();
        assert_eq!(preferences.liked, vec!["Inception"]);
        assert_eq!(preferences.interested, vec!["Inception"]);
        assert!(preferences.did_not_like.is_empty());
    }
}
