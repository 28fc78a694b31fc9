//! Audio decoding and analysis settings
use serde::Deserialize;

use super::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AudioProcessingConfig {
    pub input: InputLimits,
    pub target: TargetFormat,
    pub normalization: NormalizationConfig,
    pub spectrogram: SpectrogramConfig,
}

impl AudioProcessingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.max_bytes == 0 {
            return Err(ConfigError::invalid("input.max_bytes", "must be positive"));
        }
        if self.target.sample_rate_hz == 0 {
            return Err(ConfigError::invalid(
                "target.sample_rate_hz",
                "must be positive",
            ));
        }
        if !(self.normalization.target_peak_ratio > 0.0
            && self.normalization.target_peak_ratio <= 1.0)
        {
            return Err(ConfigError::invalid(
                "normalization.target_peak_ratio",
                "must be within (0, 1]",
            ));
        }
        if self.normalization.skip_tolerance < 0.0 {
            return Err(ConfigError::invalid(
                "normalization.skip_tolerance",
                "must not be negative",
            ));
        }
        if self.spectrogram.window_size < 2 {
            return Err(ConfigError::invalid(
                "spectrogram.window_size",
                "must be at least 2",
            ));
        }
        if self.spectrogram.hop_size == 0 {
            return Err(ConfigError::invalid("spectrogram.hop_size", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputLimits {
    /// Upper bound for an uploaded container, in bytes
    pub max_bytes: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetFormat {
    pub sample_rate_hz: u32,
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NormalizationConfig {
    /// Fraction of full scale the loudest sample is scaled to
    pub target_peak_ratio: f64,
    /// Scale factors within `1.0 ± skip_tolerance` leave the buffer untouched
    pub skip_tolerance: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            target_peak_ratio: 0.95,
            skip_tolerance: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpectrogramConfig {
    pub window_size: usize,
    pub hop_size: usize,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 512,
        }
    }
}
