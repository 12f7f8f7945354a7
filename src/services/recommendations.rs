use crate::{
    db::PreferenceStore,
    error::{AppError, AppResult},
    models::{
        ChatMessage, ChatRequest, MoviePreferences, Recommendation, RecommendationResponse,
        RatingAction, StreamChunk,
    },
    services::{preferences, providers::ChatProvider},
};

const RECOMMENDATION_INSTRUCTION: &str = "Give me a list of four movie recommendations. \
    Please return your response in a strict JSON object format, with each recommendation \
    containing a name and reason for recommendation. The reason for recommendation should \
    be concise and focus on why people like it, rather than being a review of the movie. \
    Example format: {\"1\": {\"name\": \"Movie Name\", \"reason\": \"Reason\"}, \
    \"2\": {\"name\": \"Movie Name\", \"reason\": \"Reason\"}}. \
    DO NOT LIST ANY MOVIES I ALREADY MENTIONED IN THIS RESPONSE. \
    DO NOT LIST ANY OTHER RESPONSE OTHER THAN THE JSON LIST OF FOUR MOVIES.";

/// Fallback shown when the model's response cannot be parsed
const PARSE_FAILURE_PLACEHOLDER: &str = "Failed to fetch recommendation";

/// Runs one full recommendation round trip for a user: aggregate stored
/// preferences, send them through the relay as the sole system message,
/// collect the stream, and parse the recommendation list.
///
/// The served model and the parsed list come back as two distinct fields,
/// so no caller ever has to split the concatenated `/chat` byte stream.
pub async fn recommend_for_user(
    store: &dyn PreferenceStore,
    chat: &dyn ChatProvider,
    user_id: i64,
    model: String,
    temperature: f32,
    api_key: Option<String>,
) -> AppResult<RecommendationResponse> {
    let preferences = preferences::preferences_for_user(store, user_id).await?;
    let system_message = build_system_message(&preferences);

    let request = ChatRequest {
        model,
        messages: vec![ChatMessage::system(system_message)],
        temperature,
        max_tokens: 2048,
        api_key,
    };

    let (model, body) = collect_stream(chat, request).await?;
    let recommendations = parse_recommendations(&body);

    tracing::info!(
        user_id,
        model = model.as_deref().unwrap_or("unknown"),
        count = recommendations.len(),
        "Recommendations fetched"
    );

    Ok(RecommendationResponse {
        model,
        recommendations,
    })
}

/// Builds the preference-seeded instruction sent as the system message.
///
/// Lists every bucket in a fixed order, with `(none)` standing in for empty
/// ones, followed by the strict-JSON four-movie instruction.
pub fn build_system_message(preferences: &MoviePreferences) -> String {
    let descriptions: Vec<String> = RatingAction::ALL
        .iter()
        .map(|action| {
            let titles = preferences.titles_for(*action);
            let listed = if titles.is_empty() {
                "(none)".to_string()
            } else {
                titles.join(", ")
            };
            format!(
                "Here are movies marked by this user as {}: {}.",
                action.prompt_label(),
                listed
            )
        })
        .collect();

    format!("{} {}", descriptions.join(" "), RECOMMENDATION_INSTRUCTION)
}

/// Drains the relay stream into the served model id and the full body text.
///
/// A vendor error chunk is a hard failure on this path; unlike `/chat`,
/// nothing here needs to mirror it as a fake-success body.
async fn collect_stream(
    chat: &dyn ChatProvider,
    request: ChatRequest,
) -> AppResult<(Option<String>, String)> {
    let mut rx = chat.stream_chat(request).await?;

    let mut model = None;
    let mut body = String::new();
    while let Some(item) = rx.recv().await {
        match item? {
            StreamChunk::Model(served) => model = Some(served),
            StreamChunk::Text(text) => body.push_str(&text),
            StreamChunk::UpstreamError(text) => return Err(AppError::ExternalApi(text)),
        }
    }

    Ok((model, body))
}

/// Parses the model's JSON object of `{name, reason}` pairs.
///
/// Iteration order over the object determines display order. Any shape the
/// parse cannot account for degrades to a single placeholder entry so the
/// caller stays usable.
pub fn parse_recommendations(body: &str) -> Vec<Recommendation> {
    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            let object = value.as_object()?.clone();
            let mut recommendations = Vec::with_capacity(object.len());
            for entry in object.values() {
                recommendations.push(Recommendation {
                    name: entry.get("name")?.as_str()?.to_string(),
                    reason: entry.get("reason")?.as_str()?.to_string(),
                });
            }
            Some(recommendations)
        });

    match parsed {
        Some(recommendations) => recommendations,
        None => {
            tracing::warn!(body_len = body.len(), "Failed to parse recommendation body");
            vec![Recommendation {
                name: PARSE_FAILURE_PLACEHOLDER.to_string(),
                reason: String::new(),
            }]
        }
    }
}
