//! Client configuration.

use crate::{PenchatError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the chat backend.
    pub backend_url: String,
    /// Play back the user's own clip after a voice send.
    pub autoplay_own_voice: bool,
    /// Enable microphone capture.
    pub enable_audio_input: bool,
    /// Enable speaker playback.
    pub enable_audio_output: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            autoplay_own_voice: true,
            enable_audio_input: true,
            enable_audio_output: true,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the environment, falling back to defaults.
    ///
    /// `PENCHAT_BACKEND_URL` overrides the backend address.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("PENCHAT_BACKEND_URL") {
            config.backend_url = url;
        }
        config
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn without_audio_input(mut self) -> Self {
        self.enable_audio_input = false;
        self
    }

    pub fn without_audio_output(mut self) -> Self {
        self.enable_audio_output = false;
        self
    }

    pub fn without_own_voice_autoplay(mut self) -> Self {
        self.autoplay_own_voice = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(PenchatError::ConfigError(
                "Backend URL must not be empty".into(),
            ));
        }
        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            return Err(PenchatError::ConfigError(format!(
                "Backend URL must start with http:// or https://: {}",
                self.backend_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.autoplay_own_voice);
        assert!(config.enable_audio_input);
        assert!(config.enable_audio_output);
    }

    #[test]
    fn test_builder_setters() {
        let config = ClientConfig::new()
            .with_backend_url("https://chat.example.com")
            .without_audio_input()
            .without_own_voice_autoplay();

        assert_eq!(config.backend_url, "https://chat.example.com");
        assert!(!config.enable_audio_input);
        assert!(config.enable_audio_output);
        assert!(!config.autoplay_own_voice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_url_rejected() {
        let config = ClientConfig::new().with_backend_url("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_url_rejected() {
        let config = ClientConfig::new().with_backend_url("ftp://example.com");
        assert!(config.validate().is_err());
    }
}
