pub mod audio;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod messages;
pub mod ui;
pub mod view;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PenchatError {
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Audio encoding error: {0}")]
    AudioEncodingError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PenchatError {
    /// Short user-facing description for the status line.
    pub fn user_message(&self) -> String {
        match self {
            PenchatError::AudioDeviceError(_) => "Microphone or speaker unavailable".to_string(),
            PenchatError::BackendError(_) => "Could not reach the chat backend".to_string(),
            PenchatError::AudioEncodingError(_) => "Could not process the recording".to_string(),
            PenchatError::AudioProcessingError(_) => "Could not process audio".to_string(),
            PenchatError::IOError(_) => "File access failed".to_string(),
            PenchatError::ChannelError(_) => "Internal audio pipeline stalled".to_string(),
            PenchatError::ConfigError(_) => "Invalid configuration".to_string(),
        }
    }
}

impl From<std::io::Error> for PenchatError {
    fn from(e: std::io::Error) -> Self {
        PenchatError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for PenchatError {
    fn from(e: reqwest::Error) -> Self {
        PenchatError::BackendError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PenchatError>;
