use serde::Serialize;

use crate::audio_pipeline::Spectrogram;

/// Dominant bin of one frequency band in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub time_frame: usize,
    pub freq_bin: usize,
    pub magnitude: f64,
}

/// Band-limited peak picker with a per-frame adaptive threshold
#[derive(Debug, Clone)]
pub struct PeakPicker {
    low_band_max: usize,
    mid_band_max: usize,
    peak_threshold: f64,
}

impl PeakPicker {
    pub fn new(low_band_max: usize, mid_band_max: usize, peak_threshold: f64) -> Self {
        Self {
            low_band_max,
            mid_band_max,
            peak_threshold,
        }
    }

    /// Pick at most one peak per band per frame
    ///
    /// A bin qualifies when its magnitude is strictly greater than
    /// `mean(frame) * peak_threshold`; within a band the largest qualifying bin
    /// wins and the lower bin wins ties. Peaks come out ordered by frame, then
    /// low, mid, high band.
    pub fn find_peaks(&self, spectrogram: &Spectrogram) -> Vec<Peak> {
        let mut peaks = Vec::new();

        for (time_frame, frame) in spectrogram.frames.iter().enumerate() {
            if frame.is_empty() {
                continue;
            }
            let mean = frame.iter().sum::<f64>() / frame.len() as f64;
            if mean <= 0.0 {
                continue;
            }
            let threshold = mean * self.peak_threshold;

            for (start, end) in self.bands(frame.len()) {
                let mut best: Option<(usize, f64)> = None;
                for (bin, &magnitude) in frame.iter().enumerate().take(end).skip(start) {
                    if magnitude <= threshold {
                        continue;
                    }
                    if best.map_or(true, |(_, max)| magnitude > max) {
                        best = Some((bin, magnitude));
                    }
                }

                if let Some((freq_bin, magnitude)) = best {
                    peaks.push(Peak {
                        time_frame,
                        freq_bin,
                        magnitude,
                    });
                }
            }
        }

        peaks
    }

    fn bands(&self, num_bins: usize) -> [(usize, usize); 3] {
        let low = self.low_band_max.min(num_bins);
        let mid = self.mid_band_max.min(num_bins);
        [(0, low), (low, mid), (mid, num_bins)]
    }
}
