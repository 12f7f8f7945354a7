use tokio::sync::mpsc;

/// Chat completion provider abstraction
///
/// The relay core sits behind this trait so routes and the recommendation
/// service stay decoupled from the concrete vendor. The single production
/// implementation talks to the OpenAI chat completions API.
use crate::{
    error::{AppError, AppResult},
    models::{ChatRequest, StreamChunk},
};

pub mod openai;
pub mod tmdb;

pub use openai::OpenAiProvider;
pub use tmdb::TmdbProvider;

/// One item of relayed output, or the terminal error that aborts the stream
pub type ChunkResult = Result<StreamChunk, AppError>;

/// Trait for streaming chat completion providers
///
/// `stream_chat` validates the request and credential up front, then hands
/// back a channel that yields [`StreamChunk`]s in arrival order. Dropping
/// the receiver cancels the upstream request.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Opens a streaming completion for the given request.
    ///
    /// Fails immediately, without any network call, when no credential is
    /// available. Transport and parse failures after that surface as `Err`
    /// items on the channel and terminate the stream.
    async fn stream_chat(&self, request: ChatRequest) -> AppResult<mpsc::Receiver<ChunkResult>>;
}
