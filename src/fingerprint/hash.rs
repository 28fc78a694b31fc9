use super::landmarks::LandmarkPair;

const FREQ1_MAX: usize = 0x0FFF;
const FREQ2_MAX: usize = 0x03FF;
const DELTA_MAX: usize = 0x03FF;

/// Pack a landmark pair into 12 + 10 + 10 bits
///
/// Values outside their field are clamped, so distinct out-of-range pairs can
/// share a hash.
pub fn hash_pair(pair: &LandmarkPair) -> u32 {
    let freq1 = pair.freq1.min(FREQ1_MAX) as u32;
    let freq2 = pair.freq2.min(FREQ2_MAX) as u32;
    let time_delta = pair.time_delta.min(DELTA_MAX) as u32;

    (freq1 << 20) | (freq2 << 10) | time_delta
}
