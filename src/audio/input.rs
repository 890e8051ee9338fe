//! Microphone capture feeding mono fragments into a channel.

use crate::{PenchatError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    capturing: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Open the default input device.
    ///
    /// Fails when no microphone is present or access is denied.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| PenchatError::AudioDeviceError("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| {
                PenchatError::AudioDeviceError(format!("Failed to get input config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            capturing: Arc::new(Mutex::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start streaming captured fragments to `fragment_tx`.
    ///
    /// Multi-channel devices are mixed down so fragments concatenate into a
    /// mono clip.
    pub fn start_capture(&mut self, fragment_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.capturing.lock() {
            warn!("Capture already running");
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let capturing = Arc::clone(&self.capturing);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !*capturing.lock() {
                        return;
                    }

                    let fragment = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = fragment_tx.try_send(fragment) {
                        debug!("Dropped audio fragment: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                PenchatError::AudioDeviceError(format!("Failed to build input stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            PenchatError::AudioDeviceError(format!("Failed to start input stream: {}", e))
        })?;

        *self.capturing.lock() = true;
        self.stream = Some(stream);

        info!("Microphone capture started");
        Ok(())
    }

    /// Stop capture and release the stream. Fragments already handed to the
    /// channel stay there for the caller to drain.
    pub fn stop_capture(&mut self) {
        *self.capturing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Microphone capture stopped");
        }
    }

    pub fn is_capturing(&self) -> bool {
        *self.capturing.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.stop_capture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_audio_input_open() {
        // May fail in CI environments without audio devices.
        if let Ok(input) = AudioInput::open() {
            assert!(input.sample_rate() > 0);
            assert!(input.channels() > 0);
        }
    }

    #[test]
    fn test_capture_state() {
        if let Ok(mut input) = AudioInput::open() {
            assert!(!input.is_capturing());

            let (tx, _rx) = unbounded();
            if input.start_capture(tx).is_ok() {
                assert!(input.is_capturing());

                input.stop_capture();
                assert!(!input.is_capturing());
            }
        }
    }
}
