use super::buffer::PcmBuffer;
use super::error::StageError;

/// Linear interpolation resampler for integer PCM
#[derive(Debug, Clone)]
pub struct LinearResampler {
    output_rate: u32,
}

impl LinearResampler {
    pub fn new(output_rate: u32) -> Self {
        Self { output_rate }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Convert `buffer` to the output rate, channel by channel
    ///
    /// Produces `round(frames * output_rate / input_rate)` frames. Interpolated
    /// values are rounded and clamped to the buffer's bit depth.
    pub fn resample(&self, buffer: PcmBuffer) -> Result<PcmBuffer, StageError> {
        if self.output_rate == 0 {
            return Err(StageError::invalid("output sample rate is zero"));
        }
        let input_rate = buffer.sample_rate();
        if input_rate == self.output_rate {
            return Ok(buffer);
        }

        let format = buffer.format();
        let channels = format.channels as usize;
        let input_frames = buffer.frame_count();
        let ratio = self.output_rate as f64 / input_rate as f64;
        let output_frames = (input_frames as f64 * ratio).round() as usize;
        let (min, max) = format.sample_range();

        let samples = buffer.samples();
        let mut output = Vec::with_capacity(output_frames * channels);
        for n in 0..output_frames {
            let position = n as f64 / ratio;
            let base_index = (position.floor() as usize).min(input_frames - 1);
            let next_index = (base_index + 1).min(input_frames - 1);
            let frac = position - base_index as f64;
            for channel in 0..channels {
                let a = samples[base_index * channels + channel] as f64;
                let b = samples[next_index * channels + channel] as f64;
                let value = (a + (b - a) * frac).round() as i64;
                output.push(value.clamp(min, max) as i32);
            }
        }

        PcmBuffer::new(format.with_sample_rate(self.output_rate), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_pipeline::PcmFormat;

    fn ramp(sample_rate: u32, len: usize) -> PcmBuffer {
        let format = PcmFormat {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
        };
        PcmBuffer::new(format, (0..len as i32).collect()).unwrap()
    }

    #[test]
    fn same_rate_is_identity() {
        let input = ramp(16_000, 320);
        let output = LinearResampler::new(16_000).resample(input.clone()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn downsampling_reduces_length_and_preserves_edges() {
        let input = ramp(48_000, 480);
        let output = LinearResampler::new(16_000).resample(input.clone()).unwrap();

        assert_eq!(output.frame_count(), 160);
        assert_eq!(output.sample_rate(), 16_000);
        assert_eq!(output.samples()[0], input.samples()[0]);
        assert_eq!(output.samples()[1], 3);
    }

    #[test]
    fn upsampling_interpolates_between_neighbours() {
        let input = ramp(8_000, 4);
        let output = LinearResampler::new(16_000).resample(input).unwrap();
        assert_eq!(output.frame_count(), 8);
        assert_eq!(&output.samples()[..4], &[0, 1, 1, 2]);
    }

    #[test]
    fn stereo_channels_stay_separate() {
        let format = PcmFormat {
            channels: 2,
            sample_rate: 32_000,
            bits_per_sample: 16,
        };
        let input = PcmBuffer::new(format, vec![100, -100, 100, -100, 100, -100, 100, -100]).unwrap();
        let output = LinearResampler::new(16_000).resample(input).unwrap();
        assert_eq!(output.channels(), 2);
        assert_eq!(output.samples(), &[100, -100, 100, -100]);
    }

    #[test]
    fn empty_buffer_stays_empty() {
        let input = ramp(44_100, 0);
        let output = LinearResampler::new(16_000).resample(input).unwrap();
        assert_eq!(output.frame_count(), 0);
        assert_eq!(output.sample_rate(), 16_000);
    }

    #[test]
    fn zero_output_rate_is_rejected() {
        let err = LinearResampler::new(0).resample(ramp(8_000, 4)).unwrap_err();
        assert!(matches!(err, StageError::InvalidParameters { .. }));
    }
}
