use super::buffer::PcmBuffer;
use super::error::StageError;

/// Peak normalizer scaling the loudest sample toward a fraction of full scale
#[derive(Debug, Clone)]
pub struct PeakNormalizer {
    target_peak_ratio: f64,
    skip_tolerance: f64,
}

impl PeakNormalizer {
    pub fn new(target_peak_ratio: f64, skip_tolerance: f64) -> Self {
        Self {
            target_peak_ratio,
            skip_tolerance,
        }
    }

    /// Scale every sample by `target_peak_ratio * full_scale / peak`
    ///
    /// Silent buffers and buffers whose scale factor is already within the skip
    /// tolerance of 1.0 are returned untouched. Scaled values are truncated toward
    /// zero and clamped to the bit depth's signed range.
    pub fn normalize(&self, buffer: PcmBuffer) -> Result<PcmBuffer, StageError> {
        if !(self.target_peak_ratio.is_finite() && self.target_peak_ratio > 0.0) {
            return Err(StageError::invalid(format!(
                "target peak ratio {} is not positive",
                self.target_peak_ratio
            )));
        }

        let peak = find_peak(buffer.samples());
        if peak == 0 {
            return Ok(buffer);
        }

        let format = buffer.format();
        let full_scale = format.full_scale();
        let scale = self.target_peak_ratio * full_scale as f64 / peak as f64;
        if scale >= 1.0 - self.skip_tolerance && scale <= 1.0 + self.skip_tolerance {
            return Ok(buffer);
        }

        let (min, max) = format.sample_range();
        let normalized = buffer
            .samples()
            .iter()
            .map(|sample| {
                let scaled = (*sample as f64 * scale) as i64;
                scaled.clamp(min, max) as i32
            })
            .collect();

        PcmBuffer::new(format, normalized)
    }
}

fn find_peak(samples: &[i32]) -> i64 {
    samples
        .iter()
        .map(|sample| (*sample as i64).abs())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_pipeline::PcmFormat;

    fn mono(samples: Vec<i32>) -> PcmBuffer {
        let format = PcmFormat {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
        };
        PcmBuffer::new(format, samples).unwrap()
    }

    fn normalizer() -> PeakNormalizer {
        PeakNormalizer::new(0.95, 0.01)
    }

    #[test]
    fn silence_is_returned_unchanged() {
        let input = mono(vec![0; 64]);
        let output = normalizer().normalize(input.clone()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn near_target_peak_is_returned_unchanged() {
        // 0.95 * 32768 = 31129.6
        let input = mono(vec![31_130, -12, 400]);
        let output = normalizer().normalize(input.clone()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn quiet_audio_is_scaled_up_with_truncation() {
        let input = mono(vec![10_000, -10_000, 3, -3]);
        let output = normalizer().normalize(input).unwrap();
        // scale = 31129.6 / 10000 = 3.11296
        assert_eq!(output.samples(), &[31_129, -31_129, 9, -9]);
    }

    #[test]
    fn loud_audio_is_scaled_down_within_range() {
        let input = mono(vec![i16::MIN as i32, i16::MAX as i32, 0]);
        let output = normalizer().normalize(input).unwrap();
        let (min, max) = output.format().sample_range();
        assert!(output.samples().iter().all(|s| (min..=max).contains(&(*s as i64))));
        assert_eq!(output.samples()[0], -31_129);
    }

    #[test]
    fn channel_layout_is_preserved() {
        let format = PcmFormat {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 16,
        };
        let input = PcmBuffer::new(format, vec![1000, -2000, 500, 0]).unwrap();
        let output = normalizer().normalize(input).unwrap();
        assert_eq!(output.channels(), 2);
        assert_eq!(output.frame_count(), 2);
    }
}
