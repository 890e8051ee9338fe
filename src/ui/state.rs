//! Application state and the egui-backed view adapter.

use crate::backend::ChatBackend;
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::messages::{
    AudioAttachment, AudioClip, AudioSource, ImageData, Message, MessageContent, MessageStorage,
    Sender,
};
use crate::view::ChatView;
use crossbeam_channel::Sender as ChannelSender;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::audio::{decode_wav, ToggleOutcome, VoiceRecorder};

/// Thread-safe rendering surface shared between the frame loop and the
/// dispatch tasks running on the tokio runtime.
///
/// Background tasks append through [`ChatView`]; the frame loop reads the
/// storage and flags each frame. Clones share the same backing state.
#[derive(Clone)]
pub struct SharedView {
    messages: MessageStorage,
    playback_tx: Option<ChannelSender<AudioClip>>,
    recording: Arc<AtomicBool>,
    clear_input: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<String>>>,
    repaint: Arc<Mutex<Option<egui::Context>>>,
}

impl SharedView {
    pub fn new(playback_tx: Option<ChannelSender<AudioClip>>) -> Self {
        Self {
            messages: MessageStorage::new(),
            playback_tx,
            recording: Arc::new(AtomicBool::new(false)),
            clear_input: Arc::new(AtomicBool::new(false)),
            last_error: Arc::new(Mutex::new(None)),
            repaint: Arc::new(Mutex::new(None)),
        }
    }

    /// Wire up the egui context so background appends wake the frame loop.
    pub fn attach_repaint(&self, ctx: egui::Context) {
        *self.repaint.lock() = Some(ctx);
    }

    fn request_repaint(&self) {
        if let Some(ctx) = self.repaint.lock().as_ref() {
            ctx.request_repaint();
        }
    }

    pub fn messages(&self) -> &MessageStorage {
        &self.messages
    }

    pub fn recording_active(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    /// Consume the pending clear-input request, if any.
    pub fn take_clear_input(&self) -> bool {
        self.clear_input.swap(false, Ordering::Relaxed)
    }

    /// Put a short description of the most recent failure on the status line.
    pub fn set_last_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
        self.request_repaint();
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn clear_last_error(&self) {
        *self.last_error.lock() = None;
    }

    /// Hand a clip to the playback stream. Without an output device this is
    /// a no-op.
    pub fn enqueue_playback(&self, clip: AudioClip) {
        match &self.playback_tx {
            Some(tx) => {
                if tx.send(clip).is_err() {
                    warn!("Playback channel closed; dropping clip");
                }
            }
            None => debug!("No audio output; dropping playback request"),
        }
    }
}

impl ChatView for SharedView {
    fn append_message(&self, sender: Sender, text: String) {
        self.messages
            .push(Message::new(sender, MessageContent::Text(text)));
        self.request_repaint();
    }

    fn append_audio(&self, sender: Sender, audio: AudioAttachment) {
        if audio.autoplay {
            if let AudioSource::Clip(clip) = &audio.source {
                self.enqueue_playback(clip.clone());
            }
        }
        self.messages
            .push(Message::new(sender, MessageContent::Audio(audio)));
        self.request_repaint();
    }

    fn append_image(&self, image: ImageData) {
        self.messages
            .push(Message::new(Sender::User, MessageContent::Image(image)));
        self.request_repaint();
    }

    fn set_recording_indicator(&self, active: bool) {
        self.recording.store(active, Ordering::Relaxed);
        self.request_repaint();
    }

    fn clear_input(&self) {
        self.clear_input.store(true, Ordering::Relaxed);
        self.request_repaint();
    }
}

/// Central application state driven by the frame loop.
pub struct AppState {
    view: SharedView,
    dispatcher: Arc<Dispatcher>,
    backend: Arc<dyn ChatBackend>,
    runtime: tokio::runtime::Handle,
    config: ClientConfig,

    /// Current text input
    pub input_text: String,

    recorder: VoiceRecorder,
}

impl AppState {
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn ChatBackend>,
        dispatcher: Arc<Dispatcher>,
        view: SharedView,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            view,
            dispatcher,
            backend,
            runtime,
            config,
            input_text: String::new(),
            recorder: VoiceRecorder::new(),
        }
    }

    /// Substitute the capture stack, e.g. a scripted source in tests.
    pub fn with_recorder(mut self, recorder: VoiceRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn messages(&self) -> Vec<Message> {
        self.view.messages().snapshot()
    }

    pub fn is_recording(&self) -> bool {
        self.view.recording_active()
    }

    /// Per-frame housekeeping: apply a pending input clear and drain captured
    /// audio fragments into the active session.
    pub fn poll(&mut self) {
        if self.view.take_clear_input() {
            self.input_text.clear();
        }

        self.recorder.pump();
    }

    /// Dispatch the current input text. The field is cleared only after the
    /// reply arrives, so a failed request leaves the draft in place.
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.view.clear_last_error();
        let dispatcher = Arc::clone(&self.dispatcher);
        let view = self.view.clone();
        self.runtime.spawn(async move {
            if let Err(e) = dispatcher.send_message(&text).await {
                error!("Chat request failed: {}", e);
                view.set_last_error(e.user_message());
            }
        });
    }

    /// Replay the stored conversation. Called once at startup.
    pub fn load_history(&self) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let view = self.view.clone();
        self.runtime.spawn(async move {
            if let Err(e) = dispatcher.load_chat_history().await {
                error!("Failed to load chat history: {}", e);
                view.set_last_error(e.user_message());
            }
        });
    }

    /// One press of the record toggle: start a session when idle, otherwise
    /// stop it and dispatch whatever was captured.
    pub fn toggle_recording(&mut self) {
        if !self.config.enable_audio_input {
            warn!("Audio input disabled by configuration");
            return;
        }

        match self.recorder.toggle() {
            Ok(ToggleOutcome::Started) => {
                self.view.set_recording_indicator(true);
            }
            Ok(ToggleOutcome::Stopped(clip)) => {
                self.view.set_recording_indicator(false);
                if let Some(clip) = clip {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let view = self.view.clone();
                    self.runtime.spawn(async move {
                        if let Err(e) = dispatcher.send_voice_message(clip).await {
                            error!("Voice message failed: {}", e);
                            view.set_last_error(e.user_message());
                        }
                    });
                }
            }
            Err(e) => {
                // Microphone missing or access denied: diagnostic log only,
                // nothing user-facing, state stays idle.
                error!("Could not start recording: {}", e);
                self.view.set_recording_indicator(false);
            }
        }
    }

    /// Read an image from disk and display it in the conversation.
    pub fn attach_image(&self, path: &Path) {
        let image = match std::fs::read(path) {
            Ok(data) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                let format = path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "bin".to_string());
                ImageData::new(name, data, format)
            }
            Err(e) => {
                error!("Failed to read image {}: {}", path.display(), e);
                return;
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        self.runtime.spawn(async move {
            if let Err(e) = dispatcher.send_image(Some(image)).await {
                error!("Image display failed: {}", e);
            }
        });
    }

    /// Fetch a backend-hosted audio reply and queue it for playback.
    pub fn play_remote(&self, url: String) {
        if !self.config.enable_audio_output {
            debug!("Audio output disabled; ignoring playback request");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let view = self.view.clone();
        self.runtime.spawn(async move {
            let result = backend.fetch_audio(&url).await;
            match result.and_then(|bytes| decode_wav(&bytes)) {
                Ok(clip) => view.enqueue_playback(clip),
                Err(e) => {
                    error!("Failed to play {}: {}", url, e);
                    view.set_last_error(e.user_message());
                }
            }
        });
    }

    /// Queue an in-memory clip for playback.
    pub fn play_clip(&self, clip: AudioClip) {
        if self.config.enable_audio_output {
            self.view.enqueue_playback(clip);
        }
    }
}
