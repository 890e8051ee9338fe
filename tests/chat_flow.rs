//! End-to-end conversation flows through the public API.
//!
//! These tests drive the dispatcher against an in-memory backend and assert
//! on what the shared view ends up displaying, the same surface the egui
//! frame loop reads.

use async_trait::async_trait;
use parking_lot::Mutex;
use penchat::audio::decode_wav;
use penchat::backend::{ChatBackend, ChatReply};
use penchat::dispatch::Dispatcher;
use penchat::messages::{AudioClip, AudioSource, MessageContent, Sender};
use penchat::ui::SharedView;
use penchat::{PenchatError, Result};
use std::sync::Arc;

/// Backend double that records requests and replays canned responses.
struct FakeBackend {
    chat_requests: Mutex<Vec<String>>,
    voice_requests: Mutex<Vec<Vec<u8>>>,
    reply: ChatReply,
    history: Vec<String>,
}

impl FakeBackend {
    fn new(reply: ChatReply) -> Self {
        Self {
            chat_requests: Mutex::new(Vec::new()),
            voice_requests: Mutex::new(Vec::new()),
            reply,
            history: Vec::new(),
        }
    }

    fn with_history(mut self, history: Vec<&str>) -> Self {
        self.history = history.into_iter().map(str::to_string).collect();
        self
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn send_chat(&self, text: &str) -> Result<ChatReply> {
        self.chat_requests.lock().push(text.to_string());
        Ok(self.reply.clone())
    }

    async fn send_voice(&self, wav: Vec<u8>) -> Result<ChatReply> {
        self.voice_requests.lock().push(wav);
        Ok(self.reply.clone())
    }

    async fn chat_history(&self) -> Result<Vec<String>> {
        Ok(self.history.clone())
    }

    async fn fetch_audio(&self, _url: &str) -> Result<Vec<u8>> {
        Err(PenchatError::BackendError("not served in tests".into()))
    }
}

fn reply(text: &str, audio_url: Option<&str>) -> ChatReply {
    ChatReply {
        response: text.to_string(),
        audio_url: audio_url.map(str::to_string),
    }
}

#[tokio::test]
async fn text_conversation_renders_both_sides() {
    let backend = Arc::new(FakeBackend::new(reply("hi there", None)));
    let view = SharedView::new(None);
    let dispatcher = Dispatcher::new(backend.clone(), Arc::new(view.clone()));

    dispatcher.send_message("hello").await.unwrap();

    assert_eq!(backend.chat_requests.lock().as_slice(), ["hello"]);

    let messages = view.messages().snapshot();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert!(matches!(&messages[0].content, MessageContent::Text(t) if t == "hello"));
    assert_eq!(messages[1].sender, Sender::Bot);
    assert!(matches!(&messages[1].content, MessageContent::Text(t) if t == "hi there"));

    // The input clear is requested only after the reply arrived.
    assert!(view.take_clear_input());
}

#[tokio::test]
async fn voice_round_trip_sends_playable_wav() {
    let backend = Arc::new(FakeBackend::new(reply("heard you", Some("/audio/v1.wav"))));
    let (playback_tx, playback_rx) = crossbeam_channel::unbounded();
    let view = SharedView::new(Some(playback_tx));
    let dispatcher = Dispatcher::new(backend.clone(), Arc::new(view.clone()));

    let clip = AudioClip::new(vec![0.25; 1600], 16000, 1);
    dispatcher.send_voice_message(clip).await.unwrap();

    // The uploaded bytes are a decodable WAV with the clip's shape.
    let uploads = backend.voice_requests.lock();
    assert_eq!(uploads.len(), 1);
    let decoded = decode_wav(&uploads[0]).unwrap();
    assert_eq!(decoded.sample_rate, 16000);
    assert_eq!(decoded.samples.len(), 1600);

    // The user's own clip was queued for playback; the bot's remote reply
    // was rendered but not played.
    let played = playback_rx.try_recv().unwrap();
    assert_eq!(played.samples.len(), 1600);
    assert!(playback_rx.try_recv().is_err());

    let messages = view.messages().snapshot();
    assert_eq!(messages.len(), 3);
    assert!(matches!(
        &messages[0].content,
        MessageContent::Audio(a) if matches!(a.source, AudioSource::Clip(_))
    ));
    assert!(matches!(&messages[1].content, MessageContent::Text(t) if t == "heard you"));
    assert!(matches!(
        &messages[2].content,
        MessageContent::Audio(a) if matches!(&a.source, AudioSource::Remote(url) if url == "/audio/v1.wav")
    ));
}

#[tokio::test]
async fn history_is_replayed_before_new_messages() {
    let backend = Arc::new(
        FakeBackend::new(reply("fresh reply", None))
            .with_history(vec!["hello|hi there", "lonely entry"]),
    );
    let view = SharedView::new(None);
    let dispatcher = Dispatcher::new(backend.clone(), Arc::new(view.clone()));

    dispatcher.load_chat_history().await.unwrap();
    dispatcher.send_message("and now?").await.unwrap();

    let texts: Vec<(Sender, String)> = view
        .messages()
        .snapshot()
        .into_iter()
        .map(|m| match m.content {
            MessageContent::Text(t) => (m.sender, t),
            other => panic!("Unexpected content: {:?}", other),
        })
        .collect();

    assert_eq!(
        texts,
        vec![
            (Sender::User, "hello".to_string()),
            (Sender::Bot, "hi there".to_string()),
            (Sender::User, "lonely entry".to_string()),
            (Sender::Bot, String::new()),
            (Sender::User, "and now?".to_string()),
            (Sender::Bot, "fresh reply".to_string()),
        ]
    );
}

#[tokio::test]
async fn whitespace_input_never_reaches_the_backend() {
    let backend = Arc::new(FakeBackend::new(reply("unused", None)));
    let view = SharedView::new(None);
    let dispatcher = Dispatcher::new(backend.clone(), Arc::new(view.clone()));

    dispatcher.send_message("   ").await.unwrap();

    assert!(backend.chat_requests.lock().is_empty());
    assert!(view.messages().is_empty());
    assert!(!view.take_clear_input());
}
