use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::mpsc;

use tastebuddy_api::db::{MemoryPreferenceStore, PreferenceStore};
use tastebuddy_api::error::AppResult;
use tastebuddy_api::models::{ChatRequest, RatingAction, StreamChunk};
use tastebuddy_api::routes::{create_router, AppState};
use tastebuddy_api::services::providers::{ChatProvider, ChunkResult, OpenAiProvider};

/// Chat provider that replays a fixed chunk script, for exercising the
/// relay surface without a live vendor
struct ScriptedChat {
    script: Vec<StreamChunk>,
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedChat {
    async fn stream_chat(&self, _request: ChatRequest) -> AppResult<mpsc::Receiver<ChunkResult>> {
        let (tx, rx) = mpsc::channel(self.script.len().max(1));
        for chunk in self.script.clone() {
            tx.try_send(Ok(chunk)).unwrap();
        }
        Ok(rx)
    }
}

fn create_test_server(chat: impl ChatProvider + 'static) -> (TestServer, Arc<MemoryPreferenceStore>) {
    let store = Arc::new(MemoryPreferenceStore::new());
    let state = Arc::new(AppState {
        store: store.clone(),
        chat: Arc::new(chat),
        posters: None,
    });
    let server = TestServer::new(create_router(state)).unwrap();
    (server, store)
}

fn scripted_server(script: Vec<StreamChunk>) -> (TestServer, Arc<MemoryPreferenceStore>) {
    create_test_server(ScriptedChat { script })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = scripted_server(Vec::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_rate_movie_reports_success() {
    let (server, store) = scripted_server(Vec::new());

    let response = server
        .post("/rate-movie")
        .json(&json!({
            "userId": 1,
            "movieTitle": "Inception",
            "action": "Like"
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "success": true }));

    assert_eq!(store.movie_count().await, 1);
    assert_eq!(store.rating_count().await, 1);
}

#[tokio::test]
async fn test_rate_movie_rejects_get_method() {
    let (server, _) = scripted_server(Vec::new());
    let response = server.get("/rate-movie").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_rate_movie_rejects_empty_title() {
    let (server, _) = scripted_server(Vec::new());

    let response = server
        .post("/rate-movie")
        .json(&json!({
            "userId": 1,
            "movieTitle": "   ",
            "action": "Like"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_same_title_twice_keeps_one_movie_row() {
    let (server, store) = scripted_server(Vec::new());

    for action in ["Like", "Interested"] {
        let response = server
            .post("/rate-movie")
            .json(&json!({
                "userId": 1,
                "movieTitle": "Inception",
                "action": action
            }))
            .await;
        response.assert_status_ok();
    }

    assert_eq!(store.movie_count().await, 1);
    assert_eq!(store.rating_count().await, 2);
}

#[tokio::test]
async fn test_preferences_for_fresh_user_lists_all_empty_buckets() {
    let (server, _) = scripted_server(Vec::new());

    let response = server.get("/movie-preferences?userId=7").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!({
            "Like": [],
            "Didn't like": [],
            "Interested": [],
            "Not interested": [],
            "Unsure": []
        })
    );
}

#[tokio::test]
async fn test_preferences_groups_rated_titles_by_action() {
    let (server, _) = scripted_server(Vec::new());

    for action in ["Like", "Interested"] {
        server
            .post("/rate-movie")
            .json(&json!({
                "userId": 1,
                "movieTitle": "Inception",
                "action": action
            }))
            .await
            .assert_status_ok();
    }

    let response = server.get("/movie-preferences?userId=1").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!({
            "Like": ["Inception"],
            "Didn't like": [],
            "Interested": ["Inception"],
            "Not interested": [],
            "Unsure": []
        })
    );
}

#[tokio::test]
async fn test_preferences_requires_user_id() {
    let (server, _) = scripted_server(Vec::new());

    let response = server.get("/movie-preferences").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server.get("/movie-preferences?userId=abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preferences_are_scoped_to_the_requested_user() {
    let (server, _) = scripted_server(Vec::new());

    server
        .post("/rate-movie")
        .json(&json!({
            "userId": 1,
            "movieTitle": "Her",
            "action": "Like"
        }))
        .await
        .assert_status_ok();

    let response = server.get("/movie-preferences?userId=2").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["Like"], json!([]));
}

#[tokio::test]
async fn test_chat_without_any_key_returns_400_before_network() {
    // A real provider pointed at a closed port: if the handler tried the
    // network, the test would see a 502 instead of the immediate 400.
    let provider = OpenAiProvider::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1".to_string(),
        None,
    );
    let (server, _) = create_test_server(provider);

    let response = server
        .post("/chat")
        .json(&json!({
            "model": "gpt-4",
            "messages": [{"role": "system", "content": "hi"}]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().contains("missing OpenAI API key"));
}

#[tokio::test]
async fn test_chat_streams_announcement_then_deltas() {
    let (server, _) = scripted_server(vec![
        StreamChunk::Model("gpt-4".to_string()),
        StreamChunk::Text("Hello".to_string()),
    ]);

    let response = server
        .post("/chat")
        .json(&json!({
            "model": "gpt-4",
            "messages": [{"role": "system", "content": "hi"}]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), r#"{"model":"gpt-4"}Hello"#);
}

#[tokio::test]
async fn test_chat_preserves_delta_arrival_order() {
    let (server, _) = scripted_server(vec![
        StreamChunk::Model("gpt-3.5-turbo".to_string()),
        StreamChunk::Text("one ".to_string()),
        StreamChunk::Text("two ".to_string()),
        StreamChunk::Text("three".to_string()),
    ]);

    let response = server
        .post("/chat")
        .json(&json!({ "model": "gpt-3.5-turbo", "messages": [] }))
        .await;

    assert_eq!(
        response.text(),
        r#"{"model":"gpt-3.5-turbo"}one two three"#
    );
}

#[tokio::test]
async fn test_chat_vendor_error_is_served_as_200_body() {
    let (server, _) = scripted_server(vec![StreamChunk::UpstreamError(
        "OpenAI API error: 401 Unauthorized {}".to_string(),
    )]);

    let response = server
        .post("/chat")
        .json(&json!({ "model": "gpt-4", "messages": [] }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OpenAI API error: 401 Unauthorized {}");
}

#[tokio::test]
async fn test_recommendations_round_trip() {
    let (server, store) = scripted_server(vec![
        StreamChunk::Model("gpt-4".to_string()),
        StreamChunk::Text(r#"{"1": {"name": "Arrival", "reason": "Thoughtful sci-fi"},"#.to_string()),
        StreamChunk::Text(r#" "2": {"name": "Paddington 2", "reason": "Universally loved"}}"#.to_string()),
    ]);

    store
        .record_rating(1, "Inception", RatingAction::Like)
        .await
        .unwrap();

    let response = server
        .post("/recommendations")
        .json(&json!({ "userId": 1, "model": "gpt-4" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["recommendations"][0]["name"], "Arrival");
    assert_eq!(body["recommendations"][1]["name"], "Paddington 2");
}

#[tokio::test]
async fn test_recommendations_degrade_to_placeholder_on_bad_body() {
    let (server, _) = scripted_server(vec![
        StreamChunk::Model("gpt-4".to_string()),
        StreamChunk::Text("Sure! Here are four movies you might like:".to_string()),
    ]);

    let response = server
        .post("/recommendations")
        .json(&json!({ "userId": 1, "model": "gpt-4" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["recommendations"][0]["name"],
        "Failed to fetch recommendation"
    );
}

#[tokio::test]
async fn test_poster_endpoint_reports_missing_configuration() {
    let (server, _) = scripted_server(Vec::new());

    let response = server.get("/poster?title=Inception").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}
