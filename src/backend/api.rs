use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Reply payload shared by the `/chat` and `/chat-voice` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Payload of the `/chats` history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryPayload {
    pub chat_history: Vec<String>,
}

/// The chat backend as seen by the dispatch layer.
///
/// The production implementation is [`super::HttpBackend`]; tests use
/// in-memory doubles.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// POST the user's text to `/chat`.
    async fn send_chat(&self, text: &str) -> Result<ChatReply>;

    /// POST a finished WAV blob to `/chat-voice`.
    async fn send_voice(&self, wav: Vec<u8>) -> Result<ChatReply>;

    /// GET the serialized conversation history from `/chats`.
    async fn chat_history(&self) -> Result<Vec<String>>;

    /// GET the raw bytes behind an `audio_url` reference.
    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>>;
}
