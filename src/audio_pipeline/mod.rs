//! Audio processing pipeline
//!
//! `AudioPipeline` turns an uploaded WAV container into a magnitude spectrogram:
//! validate, decode, mix down, resample, normalize, analyse. Every stage takes an
//! owned `PcmBuffer` and returns either the same buffer or a new one, so each can
//! be exercised on its own. The first failure aborts the run.
mod buffer;
mod error;
mod mixdown;
mod normalizer;
mod resampler;
mod spectrogram;
pub mod wav;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AudioProcessingConfig;

pub use buffer::{PcmBuffer, PcmFormat};
pub use error::{DecodeError, ErrorKind, PipelineError, Stage, StageError, ValidationError};
pub use mixdown::interleaved_to_mono;
pub use normalizer::PeakNormalizer;
pub use resampler::LinearResampler;
pub use spectrogram::{Spectrogram, SpectrogramGenerator};
pub use wav::AudioMetadata;

/// Summary of the analysis-ready signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedAudio {
    pub sample_rate: u32,
    pub num_samples: usize,
    /// Seconds
    pub duration: f64,
    pub bits_per_sample: u16,
    pub processed_at: DateTime<Utc>,
}

/// Everything `process` derives from one upload
#[derive(Debug, Clone)]
pub struct AudioData {
    pub metadata: AudioMetadata,
    pub audio: ProcessedAudio,
    pub buffer: PcmBuffer,
    pub spectrogram: Spectrogram,
}

/// Capability seam for anything that turns container bytes into analysis data
pub trait AudioProcessor: Send + Sync {
    fn process(&self, raw: &[u8]) -> Result<AudioData, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct AudioPipeline {
    max_input_bytes: usize,
    resampler: LinearResampler,
    normalizer: PeakNormalizer,
    spectrogram: SpectrogramGenerator,
}

impl AudioPipeline {
    pub fn new(config: &AudioProcessingConfig) -> Result<Self, PipelineError> {
        let spectrogram = SpectrogramGenerator::new(
            config.spectrogram.window_size,
            config.spectrogram.hop_size,
        )
        .map_err(PipelineError::stage(Stage::Spectrogram))?;

        Ok(Self {
            max_input_bytes: config.input.max_bytes,
            resampler: LinearResampler::new(config.target.sample_rate_hz),
            normalizer: PeakNormalizer::new(
                config.normalization.target_peak_ratio,
                config.normalization.skip_tolerance,
            ),
            spectrogram,
        })
    }

    /// Check size limits and parse the container header only
    pub fn validate(&self, raw: &[u8]) -> Result<AudioMetadata, PipelineError> {
        wav::validate_input(raw, self.max_input_bytes)?;
        Ok(wav::read_metadata(raw)?)
    }

    /// Validate, decode and mix down to mono
    pub fn convert_to_mono(&self, raw: &[u8]) -> Result<PcmBuffer, PipelineError> {
        wav::validate_input(raw, self.max_input_bytes)?;
        let decoded = wav::decode(raw)?;
        interleaved_to_mono(decoded.buffer).map_err(PipelineError::stage(Stage::Mixdown))
    }

    pub fn resample(&self, buffer: PcmBuffer) -> Result<PcmBuffer, PipelineError> {
        self.resampler
            .resample(buffer)
            .map_err(PipelineError::stage(Stage::Resample))
    }

    pub fn normalize(&self, buffer: PcmBuffer) -> Result<PcmBuffer, PipelineError> {
        self.normalizer
            .normalize(buffer)
            .map_err(PipelineError::stage(Stage::Normalize))
    }

    pub fn spectrogram(&self, buffer: &PcmBuffer) -> Spectrogram {
        self.spectrogram.generate(buffer)
    }
}

impl AudioProcessor for AudioPipeline {
    fn process(&self, raw: &[u8]) -> Result<AudioData, PipelineError> {
        wav::validate_input(raw, self.max_input_bytes)?;
        let decoded = wav::decode(raw)?;
        let metadata = decoded.metadata;

        let mono =
            interleaved_to_mono(decoded.buffer).map_err(PipelineError::stage(Stage::Mixdown))?;
        debug!(frames = mono.frame_count(), "mixdown complete");

        let resampled = self.resample(mono)?;
        debug!(
            frames = resampled.frame_count(),
            rate = resampled.sample_rate(),
            "resample complete"
        );

        let normalized = self.normalize(resampled)?;
        let spectrogram = self.spectrogram(&normalized);
        debug!(
            frames = spectrogram.frame_count(),
            bins = spectrogram.bin_count(),
            "spectrogram complete"
        );

        let audio = ProcessedAudio {
            sample_rate: normalized.sample_rate(),
            num_samples: normalized.frame_count(),
            duration: normalized.duration_secs(),
            bits_per_sample: normalized.bits_per_sample(),
            processed_at: Utc::now(),
        };
        info!(
            original_rate = metadata.original_sample_rate,
            original_channels = metadata.original_channels,
            duration = metadata.duration,
            spectrogram_frames = spectrogram.frame_count(),
            "audio processed"
        );

        Ok(AudioData {
            metadata,
            audio,
            buffer: normalized,
            spectrogram,
        })
    }
}
