use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Bot,
}

/// A finalized local recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels.max(1) as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Average interleaved channels down to a single mono channel.
    pub fn to_mono(&self) -> AudioClip {
        if self.channels <= 1 {
            return self.clone();
        }
        let channels = self.channels as usize;
        let samples = self
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        AudioClip::new(samples, self.sample_rate, 1)
    }
}

/// Where an audio message's bytes live: on the backend, or in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AudioSource {
    Remote(String),
    Clip(AudioClip),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioAttachment {
    pub source: AudioSource,
    pub autoplay: bool,
}

impl AudioAttachment {
    /// A backend-referenced audio reply. Never autoplayed.
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            source: AudioSource::Remote(url.into()),
            autoplay: false,
        }
    }

    /// A locally recorded clip.
    pub fn clip(clip: AudioClip, autoplay: bool) -> Self {
        Self {
            source: AudioSource::Clip(clip),
            autoplay,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    pub name: String,
    pub data: Vec<u8>,
    pub format: String,
}

impl ImageData {
    pub fn new(name: impl Into<String>, data: Vec<u8>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data,
            format: format.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageContent {
    Text(String),
    Audio(AudioAttachment),
    Image(ImageData),
}

/// One rendered conversation entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content,
            timestamp: Utc::now(),
        }
    }
}
