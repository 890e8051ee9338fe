//! Voice-recording lifecycle: toggle capture, accumulate fragments, finalize
//! one clip.
//!
//! Stop ordering matters: the capture source is released first, the
//! fragments still in the channel are drained, and only then is the session
//! finalized.

use crate::messages::AudioClip;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info};

#[cfg(feature = "audio-io")]
use super::input::AudioInput;

/// Recording controller states. At most one session is ever active; the
/// toggle only starts from `Idle` and only stops from `Recording`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Ordered fragment accumulator for one recording session.
#[derive(Debug)]
pub struct RecordingSession {
    fragments: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl RecordingSession {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            fragments: Vec::new(),
            sample_rate,
        }
    }

    pub fn push_fragment(&mut self, fragment: Vec<f32>) {
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Concatenate all fragments, in arrival order, into a single clip.
    ///
    /// Returns `None` when nothing was captured; an empty recording is not
    /// worth a voice dispatch.
    pub fn finalize(self) -> Option<AudioClip> {
        if self.fragments.is_empty() {
            return None;
        }

        let total = self.fragments.iter().map(Vec::len).sum();
        let mut samples = Vec::with_capacity(total);
        for fragment in self.fragments {
            samples.extend_from_slice(&fragment);
        }

        Some(AudioClip::new(samples, self.sample_rate, 1))
    }
}

/// Outcome of one toggle press.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// A new session started.
    Started,
    /// The session ended; the finalized clip is ready for the voice-send
    /// path, unless nothing was captured.
    Stopped(Option<AudioClip>),
}

/// Capture device the recorder drives.
///
/// The production source opens the default microphone; tests inject scripted
/// sources so the toggle lifecycle runs without audio hardware.
pub trait CaptureSource: Send {
    /// Begin delivering fragments to `fragment_tx`. Returns the capture
    /// sample rate.
    fn start(&mut self, fragment_tx: Sender<Vec<f32>>) -> Result<u32>;

    /// Stop delivery and release the device. Fragments already handed to
    /// the channel stay there for the recorder to drain.
    fn stop(&mut self);
}

/// Microphone-backed capture source.
#[cfg(feature = "audio-io")]
#[derive(Default)]
pub struct MicSource {
    input: Option<AudioInput>,
}

#[cfg(feature = "audio-io")]
impl CaptureSource for MicSource {
    fn start(&mut self, fragment_tx: Sender<Vec<f32>>) -> Result<u32> {
        let mut input = AudioInput::open()?;
        input.start_capture(fragment_tx)?;
        let sample_rate = input.sample_rate();
        self.input = Some(input);
        Ok(sample_rate)
    }

    fn stop(&mut self) {
        if let Some(mut input) = self.input.take() {
            input.stop_capture();
        }
    }
}

#[cfg(not(feature = "audio-io"))]
#[derive(Default)]
struct DisabledSource;

#[cfg(not(feature = "audio-io"))]
impl CaptureSource for DisabledSource {
    fn start(&mut self, _fragment_tx: Sender<Vec<f32>>) -> Result<u32> {
        Err(crate::PenchatError::AudioDeviceError(
            "Built without audio-io".into(),
        ))
    }

    fn stop(&mut self) {}
}

/// Toggle-driven recorder over a capture source.
pub struct VoiceRecorder {
    state: RecorderState,
    source: Box<dyn CaptureSource>,
    fragment_rx: Option<Receiver<Vec<f32>>>,
    session: Option<RecordingSession>,
}

impl VoiceRecorder {
    #[cfg(feature = "audio-io")]
    pub fn new() -> Self {
        Self::with_source(Box::new(MicSource::default()))
    }

    #[cfg(not(feature = "audio-io"))]
    pub fn new() -> Self {
        Self::with_source(Box::new(DisabledSource))
    }

    pub fn with_source(source: Box<dyn CaptureSource>) -> Self {
        Self {
            state: RecorderState::Idle,
            source,
            fragment_rx: None,
            session: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Toggle between idle and recording.
    ///
    /// A failure to open the capture source leaves the recorder idle; the
    /// caller logs it and moves on.
    pub fn toggle(&mut self) -> Result<ToggleOutcome> {
        match self.state {
            RecorderState::Idle => self.start(),
            RecorderState::Recording => Ok(ToggleOutcome::Stopped(self.stop())),
        }
    }

    /// Drain fragments that arrived since the last call into the session.
    ///
    /// Called from the frame loop while recording so the channel never
    /// accumulates a whole session's worth of backlog.
    pub fn pump(&mut self) {
        if self.state != RecorderState::Recording {
            return;
        }
        if let (Some(rx), Some(session)) = (&self.fragment_rx, &mut self.session) {
            while let Ok(fragment) = rx.try_recv() {
                session.push_fragment(fragment);
            }
        }
    }

    fn start(&mut self) -> Result<ToggleOutcome> {
        let (fragment_tx, fragment_rx) = unbounded();
        let sample_rate = self.source.start(fragment_tx)?;

        self.session = Some(RecordingSession::new(sample_rate));
        self.fragment_rx = Some(fragment_rx);
        self.state = RecorderState::Recording;

        info!("Recording session started at {} Hz", sample_rate);
        Ok(ToggleOutcome::Started)
    }

    fn stop(&mut self) -> Option<AudioClip> {
        self.state = RecorderState::Idle;
        self.source.stop();

        let fragment_rx = self.fragment_rx.take();
        let mut session = self.session.take()?;

        // The source is released; whatever is still queued belongs to this
        // session.
        if let Some(rx) = fragment_rx {
            while let Ok(fragment) = rx.try_recv() {
                session.push_fragment(fragment);
            }
        }

        let clip = session.finalize();
        match &clip {
            Some(clip) => info!(
                "Recording finalized: {} samples ({:.2}s)",
                clip.samples.len(),
                clip.duration_seconds()
            ),
            None => debug!("Recording finalized with no captured audio"),
        }
        clip
    }
}

impl Default for VoiceRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Source that hands out canned fragments on start and counts the
    /// number of sessions opened.
    struct ScriptedSource {
        fragments: Vec<Vec<f32>>,
        starts: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(fragments: Vec<Vec<f32>>) -> (Self, Arc<AtomicUsize>) {
            let starts = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    fragments,
                    starts: Arc::clone(&starts),
                },
                starts,
            )
        }
    }

    impl CaptureSource for ScriptedSource {
        fn start(&mut self, fragment_tx: Sender<Vec<f32>>) -> Result<u32> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            for fragment in self.fragments.drain(..) {
                let _ = fragment_tx.send(fragment);
            }
            Ok(16000)
        }

        fn stop(&mut self) {}
    }

    struct FailingSource;

    impl CaptureSource for FailingSource {
        fn start(&mut self, _fragment_tx: Sender<Vec<f32>>) -> Result<u32> {
            Err(crate::PenchatError::AudioDeviceError("access denied".into()))
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn test_session_concatenates_in_order() {
        let mut session = RecordingSession::new(16000);
        session.push_fragment(vec![0.1, 0.2]);
        session.push_fragment(vec![0.3]);
        session.push_fragment(vec![0.4, 0.5]);
        assert_eq!(session.fragment_count(), 3);

        let clip = session.finalize().unwrap();
        assert_eq!(clip.samples, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(clip.sample_rate, 16000);
        assert_eq!(clip.channels, 1);
    }

    #[test]
    fn test_empty_session_finalizes_to_none() {
        let session = RecordingSession::new(16000);
        assert!(session.finalize().is_none());
    }

    #[test]
    fn test_empty_fragments_are_ignored() {
        let mut session = RecordingSession::new(16000);
        session.push_fragment(Vec::new());
        assert_eq!(session.fragment_count(), 0);
        assert!(session.finalize().is_none());
    }

    #[test]
    fn test_recorder_starts_idle() {
        let (source, _) = ScriptedSource::new(Vec::new());
        let recorder = VoiceRecorder::with_source(Box::new(source));
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_toggle_cycle_yields_one_clip() {
        let (source, _) = ScriptedSource::new(vec![vec![0.1, 0.2], vec![0.3]]);
        let mut recorder = VoiceRecorder::with_source(Box::new(source));

        assert!(matches!(recorder.toggle(), Ok(ToggleOutcome::Started)));
        assert!(recorder.is_recording());

        match recorder.toggle() {
            Ok(ToggleOutcome::Stopped(Some(clip))) => {
                assert_eq!(clip.samples, vec![0.1, 0.2, 0.3]);
                assert_eq!(clip.sample_rate, 16000);
            }
            other => panic!("Expected a finalized clip, got {:?}", other),
        }
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_toggle_while_recording_stops_instead_of_restarting() {
        let (source, starts) = ScriptedSource::new(vec![vec![0.1]]);
        let mut recorder = VoiceRecorder::with_source(Box::new(source));

        recorder.toggle().unwrap();
        recorder.toggle().unwrap();

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_silent_session_yields_no_clip() {
        let (source, _) = ScriptedSource::new(Vec::new());
        let mut recorder = VoiceRecorder::with_source(Box::new(source));

        recorder.toggle().unwrap();
        match recorder.toggle() {
            Ok(ToggleOutcome::Stopped(None)) => {}
            other => panic!("Expected no clip, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_source_leaves_recorder_idle() {
        let mut recorder = VoiceRecorder::with_source(Box::new(FailingSource));
        assert!(recorder.toggle().is_err());
        assert_eq!(recorder.state(), RecorderState::Idle);
    }
}
