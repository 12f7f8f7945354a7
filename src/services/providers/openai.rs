use futures_util::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    error::{AppError, AppResult},
    models::{ChatMessage, ChatRequest, ChatRole, StreamChunk},
};

use super::{ChatProvider, ChunkResult};

/// Streaming relay to the OpenAI chat completions API.
///
/// Forwards one request with streaming forced on and re-emits the
/// incremental deltas as typed [`StreamChunk`]s: the model announcement
/// once, then each text fragment in arrival order. No retries, no buffering,
/// no timeout beyond what the transport enforces.
#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

/// Wire payload for the completions endpoint.
///
/// `stream` and `n` are fixed: exactly one candidate completion, always
/// streamed, regardless of what the caller asked for.
#[derive(Debug, Serialize)]
struct CompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    model: String,
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    role: Option<ChatRole>,
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(http_client: HttpClient, api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client,
            api_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    async fn stream_chat(&self, request: ChatRequest) -> AppResult<mpsc::Receiver<ChunkResult>> {
        // Credential check happens before anything touches the network.
        let api_key = self
            .api_key
            .clone()
            .or_else(|| request.api_key.clone())
            .ok_or(AppError::MissingApiKey)?;

        let payload = CompletionsRequest {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
            n: 1,
        };

        let (tx, rx) = mpsc::channel(16);
        let client = self.http_client.clone();
        let endpoint = self.endpoint();

        tokio::spawn(async move {
            if let Err(e) = relay_completion(client, endpoint, api_key, payload, &tx).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        Ok(rx)
    }
}

/// Forwards one completion request and pushes its output into the channel.
///
/// A vendor non-success status becomes a single `UpstreamError` chunk (the
/// caller sees it as the whole stream body); everything after a successful
/// status is SSE parsing. Returning `Err` aborts the stream terminally.
async fn relay_completion(
    client: HttpClient,
    endpoint: String,
    api_key: String,
    payload: CompletionsRequest,
    tx: &mpsc::Sender<ChunkResult>,
) -> AppResult<()> {
    let model = payload.model.clone();
    let response = client
        .post(&endpoint)
        .bearer_auth(&api_key)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Mirror the vendor's payload when it is JSON; anything else
        // collapses to an empty object.
        let payload = serde_json::from_str::<serde_json::Value>(&body)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "{}".to_string());

        tracing::warn!(%status, requested_model = %model, "OpenAI returned an error status");
        let _ = tx
            .send(Ok(StreamChunk::UpstreamError(format!(
                "OpenAI API error: {} {}",
                status, payload
            ))))
            .await;
        return Ok(());
    }

    let mut parser = SseLineParser::default();
    let mut assembler = ChunkAssembler::default();
    let mut body = response.bytes_stream();

    while let Some(next) = body.next().await {
        let bytes = next?;
        for data in parser.feed(&bytes) {
            match assembler.handle_event(&data)? {
                None => return Ok(()),
                Some(chunks) => {
                    for chunk in chunks {
                        if tx.send(Ok(chunk)).await.is_err() {
                            // Receiver gone: the caller cancelled. Dropping
                            // the response body stops the upstream fetch.
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Incremental server-sent-event framing.
///
/// Buffers bytes across chunk boundaries and yields the payload of each
/// complete `data:` line. Other SSE fields and comments are ignored; the
/// completions endpoint only ever uses `data`.
#[derive(Default)]
struct SseLineParser {
    buf: Vec<u8>,
}

impl SseLineParser {
    fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(data) = line.strip_prefix("data:") {
                events.push(data.trim_start().to_string());
            }
        }

        events
    }
}

/// Turns SSE payloads into output chunks, announcing the serving model
/// before the first delta that carries text.
#[derive(Default)]
struct ChunkAssembler {
    announced: bool,
}

impl ChunkAssembler {
    /// Chunks to emit for one event payload; `None` signals end-of-stream.
    ///
    /// A payload that fails to parse aborts the whole stream: there is no
    /// partial-result salvage.
    fn handle_event(&mut self, data: &str) -> AppResult<Option<Vec<StreamChunk>>> {
        if data == "[DONE]" {
            return Ok(None);
        }

        let event: CompletionChunk = serde_json::from_str(data)
            .map_err(|e| AppError::StreamParse(e.to_string()))?;
        let choice = event
            .choices
            .first()
            .ok_or_else(|| AppError::StreamParse("event has no choices".to_string()))?;

        // The vendor opens the stream with a role-only delta; drop it.
        let text = match (&choice.delta.role, &choice.delta.content) {
            (Some(_), None) => return Ok(Some(Vec::new())),
            (_, Some(content)) => content.clone(),
            (None, None) => return Ok(Some(Vec::new())),
        };

        let mut chunks = Vec::new();
        if !self.announced {
            self.announced = true;
            chunks.push(StreamChunk::Model(event.model));
        }
        if !text.is_empty() {
            chunks.push(StreamChunk::Text(text));
        }

        Ok(Some(chunks))
    }
}
