//! Peak picking and landmark pairing constants
use serde::Deserialize;

use super::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FingerprintConfig {
    /// Exclusive upper bin of the low band; the mid band starts here
    pub low_band_max: usize,
    /// Exclusive upper bin of the mid band; the high band runs to the last bin
    pub mid_band_max: usize,
    /// Multiplier applied to a frame's mean magnitude
    pub peak_threshold: f64,
    /// Number of frames after an anchor searched for targets
    pub target_zone: usize,
    pub max_pairs_per_peak: usize,
}

impl FingerprintConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_band_max > self.mid_band_max {
            return Err(ConfigError::invalid(
                "low_band_max",
                format!(
                    "{} exceeds mid_band_max {}",
                    self.low_band_max, self.mid_band_max
                ),
            ));
        }
        if !(self.peak_threshold.is_finite() && self.peak_threshold > 0.0) {
            return Err(ConfigError::invalid("peak_threshold", "must be positive"));
        }
        if self.target_zone == 0 {
            return Err(ConfigError::invalid("target_zone", "must be positive"));
        }
        if self.max_pairs_per_peak == 0 {
            return Err(ConfigError::invalid("max_pairs_per_peak", "must be positive"));
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            low_band_max: 64,
            mid_band_max: 256,
            peak_threshold: 1.5,
            target_zone: 5,
            max_pairs_per_peak: 5,
        }
    }
}
