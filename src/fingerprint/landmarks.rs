use std::collections::HashMap;

use serde::Serialize;

use super::peaks::Peak;

/// Anchor peak paired with a later target peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LandmarkPair {
    pub freq1: usize,
    pub freq2: usize,
    /// Frames between anchor and target, always at least 1
    pub time_delta: usize,
    pub anchor_time: usize,
}

#[derive(Debug, Clone)]
pub struct LandmarkPairer {
    target_zone: usize,
    max_pairs_per_peak: usize,
}

impl LandmarkPairer {
    pub fn new(target_zone: usize, max_pairs_per_peak: usize) -> Self {
        Self {
            target_zone,
            max_pairs_per_peak,
        }
    }

    /// Pair every anchor with peaks in the following `target_zone` frames
    ///
    /// Targets are visited frame by frame in ascending order and, within a frame,
    /// in the order they were picked. An anchor stops pairing as soon as it has
    /// `max_pairs_per_peak` pairs, even part way through a frame.
    pub fn create_pairs(&self, peaks: &[Peak]) -> Vec<LandmarkPair> {
        let mut by_frame: HashMap<usize, Vec<&Peak>> = HashMap::new();
        for peak in peaks {
            by_frame.entry(peak.time_frame).or_default().push(peak);
        }

        let mut pairs = Vec::new();
        for anchor in peaks {
            let mut pair_count = 0;

            'zone: for t in anchor.time_frame + 1..=anchor.time_frame + self.target_zone {
                let Some(targets) = by_frame.get(&t) else {
                    continue;
                };
                for target in targets {
                    if pair_count >= self.max_pairs_per_peak {
                        break 'zone;
                    }
                    pairs.push(LandmarkPair {
                        freq1: anchor.freq_bin,
                        freq2: target.freq_bin,
                        time_delta: target.time_frame - anchor.time_frame,
                        anchor_time: anchor.time_frame,
                    });
                    pair_count += 1;
                }
            }
        }

        pairs
    }
}
