use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::error::StageError;

/// Layout of an interleaved integer PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// `2^(bits-1)`, the magnitude of the most negative representable sample
    pub fn full_scale(&self) -> i64 {
        1_i64 << (self.bits_per_sample.clamp(1, 32) - 1)
    }

    /// Inclusive signed range for this bit depth
    pub fn sample_range(&self) -> (i64, i64) {
        let full_scale = self.full_scale();
        (-full_scale, full_scale - 1)
    }

    pub(crate) fn with_channels(self, channels: u16) -> Self {
        Self { channels, ..self }
    }

    pub(crate) fn with_sample_rate(self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..self
        }
    }
}

/// Interleaved PCM samples, owned by whichever stage produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    format: PcmFormat,
    samples: Vec<i32>,
}

impl PcmBuffer {
    /// Wrap interleaved samples; the length must be a whole number of frames
    pub fn new(format: PcmFormat, samples: Vec<i32>) -> Result<Self, StageError> {
        if format.channels == 0 {
            return Err(StageError::malformed("channel count is zero"));
        }
        if format.sample_rate == 0 {
            return Err(StageError::malformed("sample rate is zero"));
        }
        if !(1..=32).contains(&format.bits_per_sample) {
            return Err(StageError::malformed(format!(
                "unsupported bit depth {}",
                format.bits_per_sample
            )));
        }
        if samples.len() % format.channels as usize != 0 {
            return Err(StageError::malformed(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                format.channels
            )));
        }
        Ok(Self { format, samples })
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    pub fn channels(&self) -> u16 {
        self.format.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.format.bits_per_sample
    }

    /// Number of sample frames (one sample per channel each)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    pub fn frames(&self) -> std::slice::Chunks<'_, i32> {
        self.samples.chunks(self.format.channels as usize)
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.format.sample_rate as f64
    }

    /// Encode as a canonical RIFF/WAVE container
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: self.format.bits_per_sample,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(channels: u16) -> PcmFormat {
        PcmFormat {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
        }
    }

    #[test]
    fn rejects_partial_frames() {
        let err = PcmBuffer::new(format(2), vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, StageError::MalformedBuffer { .. }));
    }

    #[test]
    fn frame_count_and_range() {
        let buffer = PcmBuffer::new(format(2), vec![1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.format().sample_range(), (-32_768, 32_767));
        assert_eq!(buffer.frames().count(), 2);
    }

    #[test]
    fn wav_bytes_decode_back() {
        let buffer = PcmBuffer::new(format(1), vec![0, 100, -100, 32_767]).unwrap();
        let bytes = buffer.to_wav_bytes().unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, buffer.samples());
    }
}
