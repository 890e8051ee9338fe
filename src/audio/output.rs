//! Speaker playback of queued clips.

use super::resampler::resample_clip;
use crate::messages::AudioClip;
use crate::{PenchatError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    playing: Arc<Mutex<bool>>,
}

impl AudioOutput {
    /// Open the default output device.
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| PenchatError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| {
                PenchatError::AudioDeviceError(format!("Failed to get output config: {}", e))
            })?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            playing: Arc::new(Mutex::new(false)),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start draining clips from `clip_rx` and playing them back-to-back.
    ///
    /// Each clip is mixed to mono and resampled to the device rate before it
    /// joins the playback buffer.
    pub fn start(&mut self, clip_rx: Receiver<AudioClip>) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device_rate = self.sample_rate();
        let channels = self.config.channels as usize;
        let playing = Arc::clone(&self.playing);

        let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
        let feeder = Arc::clone(&buffer);

        std::thread::spawn(move || {
            while let Ok(clip) = clip_rx.recv() {
                match resample_clip(&clip.to_mono(), device_rate) {
                    Ok(prepared) => feeder.lock().extend_from_slice(&prepared.samples),
                    Err(e) => error!("Failed to prepare clip for playback: {}", e),
                }
            }
        });

        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut buf = buffer.lock();
                    let frames_needed = data.len() / channels;
                    let frames_available = buf.len().min(frames_needed);

                    for i in 0..frames_available {
                        let sample = buf[i];
                        for c in 0..channels {
                            data[i * channels + c] = sample;
                        }
                    }
                    buf.drain(0..frames_available);

                    for value in data.iter_mut().skip(frames_available * channels) {
                        *value = 0.0;
                    }

                    *playing.lock() = !buf.is_empty();
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                PenchatError::AudioDeviceError(format!("Failed to build output stream: {}", e))
            })?;

        stream.play().map_err(|e| {
            PenchatError::AudioDeviceError(format!("Failed to start output stream: {}", e))
        })?;

        self.stream = Some(stream);
        info!("Audio playback ready");
        Ok(())
    }

    pub fn stop(&mut self) {
        *self.playing.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.lock()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
