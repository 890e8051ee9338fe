//! In-memory WAV framing for voice blobs.
//!
//! The voice endpoint takes a single `audio/wav` blob, so recordings are
//! framed as 16-bit PCM into a memory cursor rather than a file.

use crate::messages::AudioClip;
use crate::{PenchatError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

/// Encode a clip into a WAV blob (16-bit PCM).
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: clip.channels.max(1),
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(|e| {
            PenchatError::AudioEncodingError(format!("Failed to create WAV writer: {}", e))
        })?;

        for &sample in &clip.samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16).map_err(|e| {
                PenchatError::AudioEncodingError(format!("Failed to write sample: {}", e))
            })?;
        }

        writer.finalize().map_err(|e| {
            PenchatError::AudioEncodingError(format!("Failed to finalize WAV blob: {}", e))
        })?;
    }

    Ok(cursor.into_inner())
}

/// Decode a WAV blob back into a clip.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioClip> {
    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(|e| {
        PenchatError::AudioEncodingError(format!("Failed to read WAV blob: {}", e))
    })?;

    let spec = reader.spec();

    let samples: Result<Vec<f32>> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| {
                s.map_err(|e| {
                    PenchatError::AudioEncodingError(format!("Failed to read sample: {}", e))
                })
            })
            .collect(),
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| {
                    s.map(|v| v as f32 / i16::MAX as f32).map_err(|e| {
                        PenchatError::AudioEncodingError(format!("Failed to read sample: {}", e))
                    })
                })
                .collect(),
            24 => reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| v as f32 / 8388608.0).map_err(|e| {
                        PenchatError::AudioEncodingError(format!("Failed to read sample: {}", e))
                    })
                })
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| v as f32 / i32::MAX as f32).map_err(|e| {
                        PenchatError::AudioEncodingError(format!("Failed to read sample: {}", e))
                    })
                })
                .collect(),
            other => {
                return Err(PenchatError::AudioEncodingError(format!(
                    "Unsupported bit depth: {}",
                    other
                )))
            }
        },
    };

    Ok(AudioClip::new(samples?, spec.sample_rate, spec.channels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_clip(sample_rate: u32, seconds: f32) -> AudioClip {
        let samples: Vec<f32> = (0..(sample_rate as f32 * seconds) as usize)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioClip::new(samples, sample_rate, 1)
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let clip = sine_clip(16000, 1.0);
        let blob = encode_wav(&clip).unwrap();

        // RIFF header plus 2 bytes per sample.
        assert!(blob.len() > clip.samples.len() * 2);

        let decoded = decode_wav(&blob).unwrap();
        assert_eq!(decoded.sample_rate, 16000);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), clip.samples.len());

        // Some precision loss from the i16 conversion is expected.
        for (original, decoded) in clip.samples.iter().zip(decoded.samples.iter()) {
            assert!((original - decoded).abs() < 0.001);
        }
    }

    #[test]
    fn test_encode_empty_clip_is_header_only() {
        let clip = AudioClip::new(Vec::new(), 16000, 1);
        let blob = encode_wav(&clip).unwrap();
        assert!(!blob.is_empty());

        let decoded = decode_wav(&blob).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_wav(b"definitely not a wav").is_err());
    }
}
