use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod chat;

pub use chat::{
    ChatMessage, ChatRequest, ChatRole, ModelAnnouncement, Recommendation,
    RecommendationResponse, StreamChunk,
};

/// One of the closed set of judgments a user can pass on a title.
///
/// The serde representation uses the display labels the browser sends
/// ("Didn't like", "Not interested"); the database stores the bare variant
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingAction {
    Like,
    #[serde(rename = "Didn't like")]
    DidNotLike,
    Interested,
    #[serde(rename = "Not interested")]
    NotInterested,
    Unsure,
}

impl RatingAction {
    /// Every action, in the fixed order used for aggregation and prompts
    pub const ALL: [RatingAction; 5] = [
        RatingAction::Like,
        RatingAction::DidNotLike,
        RatingAction::Interested,
        RatingAction::NotInterested,
        RatingAction::Unsure,
    ];

    /// Label shown to users and used as the JSON key in API responses
    pub fn label(&self) -> &'static str {
        match self {
            RatingAction::Like => "Like",
            RatingAction::DidNotLike => "Didn't like",
            RatingAction::Interested => "Interested",
            RatingAction::NotInterested => "Not interested",
            RatingAction::Unsure => "Unsure",
        }
    }

    /// Phrase interpolated into the recommendation prompt
    pub fn prompt_label(&self) -> &'static str {
        match self {
            RatingAction::Like => "liked",
            RatingAction::DidNotLike => "not liked",
            RatingAction::Interested => "Interested",
            RatingAction::NotInterested => "Not Interested",
            RatingAction::Unsure => "unsure",
        }
    }

    /// Name stored in the `movie_ratings.rating` column
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RatingAction::Like => "Like",
            RatingAction::DidNotLike => "DidNotLike",
            RatingAction::Interested => "Interested",
            RatingAction::NotInterested => "NotInterested",
            RatingAction::Unsure => "Unsure",
        }
    }

    /// Inverse of [`RatingAction::as_db_str`]
    pub fn from_db_str(value: &str) -> Option<RatingAction> {
        match value {
            "Like" => Some(RatingAction::Like),
            "DidNotLike" => Some(RatingAction::DidNotLike),
            "Interested" => Some(RatingAction::Interested),
            "NotInterested" => Some(RatingAction::NotInterested),
            "Unsure" => Some(RatingAction::Unsure),
            _ => None,
        }
    }
}

/// A persisted movie row, keyed by its unique title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
}

/// A persisted rating row
///
/// Ratings are insert-only: re-rating a title adds a new row rather than
/// rewriting an old one. The rationale field exists in the schema but is
/// always empty in practice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRating {
    pub id: i64,
    pub movie_id: i64,
    pub user_id: i64,
    pub rating: RatingAction,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

/// A rating joined with its movie title, as listed per user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedTitle {
    pub action: RatingAction,
    pub title: String,
}

/// A user's titles grouped by rating action.
///
/// Every bucket is always present, possibly empty; titles keep the order the
/// ratings were recorded in. Serializes with the display labels as keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoviePreferences {
    #[serde(rename = "Like", default)]
    pub liked: Vec<String>,
    #[serde(rename = "Didn't like", default)]
    pub did_not_like: Vec<String>,
    #[serde(rename = "Interested", default)]
    pub interested: Vec<String>,
    #[serde(rename = "Not interested", default)]
    pub not_interested: Vec<String>,
    #[serde(rename = "Unsure", default)]
    pub unsure: Vec<String>,
}

impl MoviePreferences {
    /// Adds a title to the bucket for the given action
    pub fn push(&mut self, action: RatingAction, title: String) {
        self.bucket_mut(action).push(title);
    }

    /// Titles in the bucket for the given action
    pub fn titles_for(&self, action: RatingAction) -> &[String] {
        match action {
            RatingAction::Like => &self.liked,
            RatingAction::DidNotLike => &self.did_not_like,
            RatingAction::Interested => &self.interested,
            RatingAction::NotInterested => &self.not_interested,
            RatingAction::Unsure => &self.unsure,
        }
    }

    fn bucket_mut(&mut self, action: RatingAction) -> &mut Vec<String> {
        match action {
            RatingAction::Like => &mut self.liked,
            RatingAction::DidNotLike => &mut self.did_not_like,
            RatingAction::Interested => &mut self.interested,
            RatingAction::NotInterested => &mut self.not_interested,
            RatingAction::Unsure => &mut self.unsure,
        }
    }
}

impl FromIterator<RatedTitle> for MoviePreferences {
    fn from_iter<I: IntoIterator<Item = RatedTitle>>(iter: I) -> Self {
        let mut preferences = MoviePreferences::default();
        for rated in iter {
            preferences.push(rated.action, rated.title);
        }
        preferences
    }
}
