use serde::{Deserialize, Serialize};

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// Body of a `POST /chat` request.
///
/// Sampling parameters fall back to the relay's historical defaults when the
/// caller omits them. The optional `apiKey` is only consulted when no key is
/// configured server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, rename = "apiKey")]
    pub api_key: Option<String>,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    2048
}

/// First segment of the relay's output stream, identifying which model
/// actually served the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAnnouncement {
    pub model: String,
}

/// One unit of relay output, in arrival order.
///
/// `Model` is emitted exactly once, before any text. `UpstreamError` carries
/// the vendor's error payload and is the entire output when it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Model(String),
    Text(String),
    UpstreamError(String),
}

/// A recommended title with the model's one-line pitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub reason: String,
}

/// Result of a full recommendation round trip: the served model and the
/// parsed list, as two distinct fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub model: Option<String>,
    pub recommendations: Vec<Recommendation>,
}
