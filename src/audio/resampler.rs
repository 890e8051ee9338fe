//! Sinc-filtered sample-rate conversion.
//!
//! Playback clips arrive at whatever rate they were recorded or served at
//! and have to match the output device rate. The sinc filter keeps
//! out-of-band content from folding back into the audible range when
//! downsampling.

use crate::messages::AudioClip;
use crate::{PenchatError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

pub struct ClipResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
}

impl ClipResampler {
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(PenchatError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }
        if channels == 0 {
            return Err(PenchatError::ConfigError(
                "Number of channels must be greater than 0".into(),
            ));
        }

        let resample_ratio = output_rate as f64 / input_rate as f64;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        // Frames per channel handed to the resampler per call.
        let chunk_size = 1024;

        let resampler =
            SincFixedIn::<f32>::new(resample_ratio, 2.0, params, chunk_size, channels as usize)
                .map_err(|e| {
                    PenchatError::AudioProcessingError(format!("Failed to create resampler: {}", e))
                })?;

        debug!(
            "Created resampler: {} Hz -> {} Hz, {} channels",
            input_rate, output_rate, channels
        );

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels: channels as usize,
        })
    }

    /// Resample interleaved samples to the output rate.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.resampler.input_frames_max();
        let total_frames = input.len() / self.channels;

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let estimated_output_frames = (total_frames as f64 * ratio * 1.1) as usize;
        let mut output = Vec::with_capacity(estimated_output_frames * self.channels);

        let mut frame_offset = 0;
        while frame_offset < total_frames {
            let frames_remaining = total_frames - frame_offset;
            let frames_to_read = frames_remaining.min(chunk_size);

            // SincFixedIn wants exactly chunk_size frames per call; the tail
            // chunk is zero-padded.
            let mut input_planar = vec![vec![0.0f32; chunk_size]; self.channels];
            for frame_idx in 0..frames_to_read {
                let src_idx = (frame_offset + frame_idx) * self.channels;
                for ch_idx in 0..self.channels {
                    input_planar[ch_idx][frame_idx] = input[src_idx + ch_idx];
                }
            }

            let output_planar = self.resampler.process(&input_planar, None).map_err(|e| {
                PenchatError::AudioProcessingError(format!("Resampling failed: {}", e))
            })?;

            // On the padded tail chunk, only keep the share of output that
            // corresponds to real input.
            let output_frames = output_planar[0].len();
            let frames_to_take = if frames_remaining < chunk_size {
                ((frames_to_read as f64) * ratio).ceil() as usize
            } else {
                output_frames
            };

            for frame_idx in 0..frames_to_take.min(output_frames) {
                for ch_idx in 0..self.channels {
                    output.push(output_planar[ch_idx][frame_idx]);
                }
            }

            frame_offset += frames_to_read;
        }

        debug!(
            "Resampled {} frames -> {} frames",
            total_frames,
            output.len() / self.channels
        );

        Ok(output)
    }
}

/// Resample a clip to `target_rate` in one step.
pub fn resample_clip(clip: &AudioClip, target_rate: u32) -> Result<AudioClip> {
    if clip.sample_rate == target_rate || clip.is_empty() {
        return Ok(clip.clone());
    }

    let mut resampler = ClipResampler::new(clip.sample_rate, target_rate, clip.channels.max(1))?;
    let samples = resampler.process(&clip.samples)?;
    Ok(AudioClip::new(samples, target_rate, clip.channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, rate: u32, seconds: f32) -> Vec<f32> {
        (0..(rate as f32 * seconds) as usize)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    /// Single-bin DFT amplitude of `freq` in `samples`.
    fn tone_amplitude(samples: &[f32], freq: f64, rate: f64) -> f64 {
        let (mut re, mut im) = (0.0f64, 0.0f64);
        for (i, &s) in samples.iter().enumerate() {
            let phase = 2.0 * std::f64::consts::PI * freq * i as f64 / rate;
            re += s as f64 * phase.cos();
            im += s as f64 * phase.sin();
        }
        2.0 * (re * re + im * im).sqrt() / samples.len() as f64
    }

    #[test]
    fn test_resampler_creation() {
        assert!(ClipResampler::new(16000, 48000, 1).is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(ClipResampler::new(0, 48000, 1).is_err());
        assert!(ClipResampler::new(16000, 0, 1).is_err());
        assert!(ClipResampler::new(16000, 48000, 0).is_err());
    }

    #[test]
    fn test_upsampling_grows_output() {
        let clip = AudioClip::new(sine(440.0, 16000, 0.5), 16000, 1);
        let out = resample_clip(&clip, 48000).unwrap();
        assert_eq!(out.sample_rate, 48000);
        assert!(out.samples.len() > clip.samples.len() * 2);
    }

    #[test]
    fn test_downsampling_shrinks_output() {
        let clip = AudioClip::new(sine(440.0, 48000, 0.5), 48000, 1);
        let out = resample_clip(&clip, 16000).unwrap();
        assert_eq!(out.sample_rate, 16000);
        assert!(out.samples.len() < clip.samples.len() / 2);
    }

    #[test]
    fn test_same_rate_is_untouched() {
        let clip = AudioClip::new(vec![0.1, 0.2, 0.3], 16000, 1);
        let out = resample_clip(&clip, 16000).unwrap();
        assert_eq!(out.samples, clip.samples);
    }

    #[test]
    fn test_empty_clip_stays_empty() {
        let clip = AudioClip::new(Vec::new(), 48000, 1);
        let out = resample_clip(&clip, 16000).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_downsampling_suppresses_out_of_band_tones() {
        // A 6.5 kHz tone sits above the 4 kHz Nyquist limit of an 8 kHz
        // target; without a lowpass it folds back to 1.5 kHz at full
        // amplitude.
        let clip = AudioClip::new(sine(6500.0, 48000, 1.0), 48000, 1);
        let out = resample_clip(&clip, 8000).unwrap();

        let alias = tone_amplitude(&out.samples, 1500.0, 8000.0);
        assert!(alias < 0.05, "aliased 1.5 kHz energy too high: {}", alias);
    }

    #[test]
    fn test_downsampling_preserves_in_band_tones() {
        let clip = AudioClip::new(sine(1000.0, 48000, 1.0), 48000, 1);
        let out = resample_clip(&clip, 8000).unwrap();

        let tone = tone_amplitude(&out.samples, 1000.0, 8000.0);
        assert!(tone > 0.8, "in-band 1 kHz tone attenuated: {}", tone);
    }
}
