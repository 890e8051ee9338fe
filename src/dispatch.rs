//! Dispatch layer: builds backend requests and relays results to the view.
//!
//! Each operation follows the same shape: render what the user produced,
//! await the backend, render what came back. Errors bubble to the spawning
//! task, where they are logged; nothing is retried.

use crate::audio::encode_wav;
use crate::backend::{ChatBackend, HistoryEntry};
use crate::messages::{AudioAttachment, AudioClip, ImageData, Sender};
use crate::view::ChatView;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    view: Arc<dyn ChatView>,
    autoplay_own_voice: bool,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>, view: Arc<dyn ChatView>) -> Self {
        Self {
            backend,
            view,
            autoplay_own_voice: true,
        }
    }

    /// Whether the user's own recorded clip is autoplayed after a voice send.
    pub fn with_autoplay_own_voice(mut self, autoplay: bool) -> Self {
        self.autoplay_own_voice = autoplay;
        self
    }

    /// Send a text message. Whitespace-only input is a no-op: no render, no
    /// network call.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        // Optimistic render before the request goes out.
        self.view.append_message(Sender::User, text.to_string());

        let reply = self.backend.send_chat(text).await?;

        self.view.append_message(Sender::Bot, reply.response);
        if let Some(url) = reply.audio_url {
            self.view.append_audio(Sender::Bot, AudioAttachment::remote(url));
        }
        self.view.clear_input();
        Ok(())
    }

    /// Display an image locally. The backend has no image upload wired to
    /// this flow, so nothing is transmitted.
    pub async fn send_image(&self, image: Option<ImageData>) -> Result<()> {
        let Some(image) = image else {
            return Ok(());
        };
        debug!("Displaying local image: {} ({} bytes)", image.name, image.data.len());
        self.view.append_image(image);
        Ok(())
    }

    /// Send a finalized recording to the voice endpoint, then render the
    /// user's own clip followed by the bot's text and audio.
    pub async fn send_voice_message(&self, clip: AudioClip) -> Result<()> {
        let wav = encode_wav(&clip)?;
        debug!("Dispatching voice message ({} bytes)", wav.len());

        let reply = self.backend.send_voice(wav).await?;

        self.view.append_audio(
            Sender::User,
            AudioAttachment::clip(clip, self.autoplay_own_voice),
        );
        self.view.append_message(Sender::Bot, reply.response);
        if let Some(url) = reply.audio_url {
            self.view.append_audio(Sender::Bot, AudioAttachment::remote(url));
        }
        Ok(())
    }

    /// Fetch past turns and replay them through the view in original order,
    /// user half before bot half. A malformed entry yields an empty bot
    /// half rather than an error.
    pub async fn load_chat_history(&self) -> Result<()> {
        let entries = self.backend.chat_history().await?;
        info!("Replaying {} history entries", entries.len());

        for raw in &entries {
            let entry = HistoryEntry::parse(raw);
            self.view.append_message(Sender::User, entry.user);
            self.view
                .append_message(Sender::Bot, entry.bot.unwrap_or_default());
        }
        Ok(())
    }
}
