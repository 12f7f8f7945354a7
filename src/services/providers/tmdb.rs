use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

const POSTER_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

/// Poster lookup against the TMDB movie search API.
///
/// Resolves a movie title to the poster image URL of the first search
/// result, or `None` when TMDB has nothing for the title.
#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    poster_path: Option<String>,
}

impl TmdbProvider {
    pub fn new(http_client: HttpClient, api_url: String, api_key: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    pub async fn poster_url(&self, title: &str) -> AppResult<Option<String>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Movie title cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search/movie", self.api_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await?;
        let poster = first_poster(&search);

        tracing::debug!(title = %title, found = poster.is_some(), "Poster lookup completed");

        Ok(poster)
    }
}

/// Poster URL of the first result, when it has a poster at all
fn first_poster(search: &SearchResponse) -> Option<String> {
    search
        .results
        .first()
        .and_then(|result| result.poster_path.as_deref())
        .map(|path| format!("{}{}", POSTER_IMAGE_BASE, path))
}
