//! Magnitude short-time Fourier transform
//!
//! Frames advance by `hop_size` samples and are dropped rather than zero padded
//! once a window would run past the end of the buffer. Each frame is Hann
//! windowed and only the non-negative frequency half of the spectrum is kept.
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use super::buffer::PcmBuffer;
use super::error::StageError;

#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// `frames[t][bin]`, each frame `window_size / 2` magnitudes long
    pub frames: Vec<Vec<f64>>,
    /// Centre frequency in Hz of each bin
    pub frequency_bins: Vec<f64>,
    /// Start time in seconds of each frame
    pub time_frames: Vec<f64>,
    pub sample_rate: u32,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn bin_count(&self) -> usize {
        self.frequency_bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Reusable STFT plan for one window/hop configuration
#[derive(Clone)]
pub struct SpectrogramGenerator {
    window_size: usize,
    hop_size: usize,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectrogramGenerator {
    /// Plan an FFT of `window_size` points; any size is accepted by the planner
    pub fn new(window_size: usize, hop_size: usize) -> Result<Self, StageError> {
        if window_size < 2 {
            return Err(StageError::invalid(format!(
                "window size {window_size} is smaller than 2"
            )));
        }
        if hop_size == 0 {
            return Err(StageError::invalid("hop size is zero"));
        }

        let fft = FftPlanner::<f64>::new().plan_fft_forward(window_size);
        Ok(Self {
            window_size,
            hop_size,
            window: hann_window(window_size),
            fft,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of complete windows that fit into `num_samples`
    pub fn frame_count(&self, num_samples: usize) -> usize {
        if num_samples < self.window_size {
            0
        } else {
            (num_samples - self.window_size) / self.hop_size + 1
        }
    }

    /// Analyse `buffer`, mixing channels and scaling samples to [-1, 1]
    pub fn generate(&self, buffer: &PcmBuffer) -> Spectrogram {
        let sample_rate = buffer.sample_rate();
        let samples = to_unit_range(buffer);
        let num_frames = self.frame_count(samples.len());
        let num_bins = self.window_size / 2;

        let mut frames = Vec::with_capacity(num_frames);
        let mut time_frames = Vec::with_capacity(num_frames);
        let mut spectrum = vec![Complex { re: 0.0, im: 0.0 }; self.window_size];

        for frame_index in 0..num_frames {
            let start = frame_index * self.hop_size;
            let window_samples = &samples[start..start + self.window_size];

            for ((bin, sample), weight) in spectrum
                .iter_mut()
                .zip(window_samples.iter())
                .zip(self.window.iter())
            {
                *bin = Complex {
                    re: sample * weight,
                    im: 0.0,
                };
            }
            self.fft.process(&mut spectrum);

            let magnitudes: Vec<f64> = spectrum[..num_bins]
                .iter()
                .map(|c| (c.re * c.re + c.im * c.im).sqrt())
                .collect();
            frames.push(magnitudes);
            time_frames.push(start as f64 / sample_rate as f64);
        }

        let frequency_bins = (0..num_bins)
            .map(|i| i as f64 * sample_rate as f64 / self.window_size as f64)
            .collect();

        Spectrogram {
            frames,
            frequency_bins,
            time_frames,
            sample_rate,
        }
    }
}

impl fmt::Debug for SpectrogramGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrogramGenerator")
            .field("window_size", &self.window_size)
            .field("hop_size", &self.hop_size)
            .finish()
    }
}

fn hann_window(size: usize) -> Vec<f64> {
    let n = size as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1.0)).cos()))
        .collect()
}

fn to_unit_range(buffer: &PcmBuffer) -> Vec<f64> {
    let full_scale = buffer.format().full_scale() as f64;
    let channels = buffer.channels() as f64;
    buffer
        .frames()
        .map(|frame| {
            let sum: i64 = frame.iter().map(|s| *s as i64).sum();
            sum as f64 / channels / full_scale
        })
        .collect()
}
