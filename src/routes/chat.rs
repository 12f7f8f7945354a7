use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use futures_util::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    error::AppError,
    middleware::RequestId,
    models::{ChatRequest, ModelAnnouncement, StreamChunk},
    routes::AppState,
};

/// Handler for the streaming relay endpoint.
///
/// The response body is the relayed completion: the model announcement
/// first, then the text deltas, concatenated with no delimiter. A vendor
/// error becomes the whole body, still under a 200 status, matching the
/// historical interface.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> Response {
    tracing::info!(
        request_id = %request_id,
        model = %request.model,
        messages = request.messages.len(),
        "Relaying chat completion"
    );

    match state.chat.stream_chat(request).await {
        Ok(rx) => {
            let stream = ReceiverStream::new(rx)
                .map(|item| item.map(chunk_bytes).map_err(axum::BoxError::from));
            Body::from_stream(stream).into_response()
        }
        Err(AppError::MissingApiKey) => (
            StatusCode::BAD_REQUEST,
            "Error: missing OpenAI API key. Provide it in the request body \
             or configure it on the server.",
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Wire encoding of one stream chunk
fn chunk_bytes(chunk: StreamChunk) -> Bytes {
    match chunk {
        StreamChunk::Model(model) => {
            let announcement = ModelAnnouncement { model };
            // Serializing a plain string field cannot fail
            Bytes::from(serde_json::to_vec(&announcement).unwrap_or_default())
        }
        StreamChunk::Text(text) => Bytes::from(text),
        StreamChunk::UpstreamError(text) => Bytes::from(text),
    }
}
