#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod recorder;
pub mod resampler;
pub mod wav;

#[cfg(feature = "audio-io")]
pub use input::AudioInput;
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
#[cfg(feature = "audio-io")]
pub use recorder::MicSource;
pub use recorder::{CaptureSource, RecorderState, RecordingSession, ToggleOutcome, VoiceRecorder};
pub use resampler::{resample_clip, ClipResampler};
pub use wav::{decode_wav, encode_wav};
