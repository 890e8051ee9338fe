//! reqwest-backed implementation of the backend contract.

use super::api::{ChatBackend, ChatReply, HistoryPayload};
use crate::{PenchatError, Result};
use async_trait::async_trait;
use reqwest::multipart;
use tracing::debug;

pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a possibly relative `audio_url` against the backend base.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, text: &str) -> Result<ChatReply> {
        debug!("POST /chat ({} chars)", text.len());
        let reply = self
            .client
            .post(self.endpoint("/chat"))
            .form(&[("user_input", text)])
            .send()
            .await?
            .error_for_status()?
            .json::<ChatReply>()
            .await?;
        Ok(reply)
    }

    async fn send_voice(&self, wav: Vec<u8>) -> Result<ChatReply> {
        debug!("POST /chat-voice ({} bytes)", wav.len());
        let part = multipart::Part::bytes(wav)
            .file_name("voice.wav")
            .mime_str("audio/wav")
            .map_err(|e| {
                PenchatError::BackendError(format!("Failed to build voice part: {}", e))
            })?;
        let form = multipart::Form::new().part("voice", part);

        let reply = self
            .client
            .post(self.endpoint("/chat-voice"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatReply>()
            .await?;
        Ok(reply)
    }

    async fn chat_history(&self) -> Result<Vec<String>> {
        debug!("GET /chats");
        let payload = self
            .client
            .get(self.endpoint("/chats"))
            .send()
            .await?
            .error_for_status()?
            .json::<HistoryPayload>()
            .await?;
        Ok(payload.chat_history)
    }

    async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(url);
        debug!("GET {}", resolved);
        let bytes = self
            .client
            .get(resolved)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.endpoint("/chat"), "http://localhost:8000/chat");
    }

    #[test]
    fn test_resolve_relative_url() {
        let backend = HttpBackend::new("http://localhost:8000");
        assert_eq!(
            backend.resolve("/audio/r1.wav"),
            "http://localhost:8000/audio/r1.wav"
        );
        assert_eq!(
            backend.resolve("audio/r1.wav"),
            "http://localhost:8000/audio/r1.wav"
        );
    }

    #[test]
    fn test_resolve_absolute_url_untouched() {
        let backend = HttpBackend::new("http://localhost:8000");
        assert_eq!(
            backend.resolve("https://cdn.example.com/r1.wav"),
            "https://cdn.example.com/r1.wav"
        );
    }
}
