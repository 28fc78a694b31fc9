//! Landmark fingerprint generation
//!
//! Peaks are picked per frequency band, paired with later peaks inside a short
//! target zone and each pair is bit-packed into a 32-bit hash anchored at the
//! frame of its first peak.
mod hash;
mod landmarks;
mod peaks;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::audio_pipeline::Spectrogram;
use crate::config::FingerprintConfig;

pub use hash::hash_pair;
pub use landmarks::{LandmarkPair, LandmarkPairer};
pub use peaks::{Peak, PeakPicker};

const BLOB_RECORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Unset until the fingerprint is attached to a stored song
    pub song_id: Option<Uuid>,
    pub hash: u32,
    /// Spectrogram frame index of the anchor peak
    pub time_offset: u32,
}

impl Fingerprint {
    pub fn with_song_id(self, song_id: Uuid) -> Self {
        Self {
            song_id: Some(song_id),
            ..self
        }
    }
}

/// Capability seam for anything that turns a spectrogram into fingerprints
pub trait FingerprintGenerator: Send + Sync {
    fn generate(&self, spectrogram: &Spectrogram) -> Vec<Fingerprint>;
}

#[derive(Debug, Clone)]
pub struct LandmarkFingerprinter {
    picker: PeakPicker,
    pairer: LandmarkPairer,
}

impl LandmarkFingerprinter {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            picker: PeakPicker::new(
                config.low_band_max,
                config.mid_band_max,
                config.peak_threshold,
            ),
            pairer: LandmarkPairer::new(config.target_zone, config.max_pairs_per_peak),
        }
    }

    pub fn find_peaks(&self, spectrogram: &Spectrogram) -> Vec<Peak> {
        self.picker.find_peaks(spectrogram)
    }

    pub fn create_landmark_pairs(&self, peaks: &[Peak]) -> Vec<LandmarkPair> {
        self.pairer.create_pairs(peaks)
    }
}

impl Default for LandmarkFingerprinter {
    fn default() -> Self {
        Self::new(&FingerprintConfig::default())
    }
}

impl FingerprintGenerator for LandmarkFingerprinter {
    fn generate(&self, spectrogram: &Spectrogram) -> Vec<Fingerprint> {
        let peaks = self.find_peaks(spectrogram);
        if peaks.is_empty() {
            debug!(frames = spectrogram.frame_count(), "no spectral peaks found");
            return Vec::new();
        }

        let pairs = self.create_landmark_pairs(&peaks);
        let fingerprints: Vec<Fingerprint> = pairs
            .iter()
            .map(|pair| {
                // a frame index above u32::MAX needs more than 2^41 samples at a
                // 512 hop, far beyond anything the input size limit admits
                debug_assert!(u32::try_from(pair.anchor_time).is_ok());
                Fingerprint {
                    song_id: None,
                    hash: hash_pair(pair),
                    time_offset: u32::try_from(pair.anchor_time).unwrap_or(u32::MAX),
                }
            })
            .collect();

        debug!(
            peaks = peaks.len(),
            pairs = pairs.len(),
            fingerprints = fingerprints.len(),
            "fingerprints generated"
        );
        fingerprints
    }
}

/// Pack fingerprints as consecutive big-endian `(hash, time_offset)` records
pub fn encode_blob(fingerprints: &[Fingerprint]) -> Bytes {
    let mut blob = BytesMut::with_capacity(fingerprints.len() * BLOB_RECORD_LEN);
    for fp in fingerprints {
        blob.put_u32(fp.hash);
        blob.put_u32(fp.time_offset);
    }
    blob.freeze()
}

/// Unpack a blob written by [`encode_blob`]; a trailing partial record is ignored
pub fn decode_blob(mut blob: &[u8]) -> Vec<Fingerprint> {
    let mut fingerprints = Vec::with_capacity(blob.len() / BLOB_RECORD_LEN);
    while blob.remaining() >= BLOB_RECORD_LEN {
        let hash = blob.get_u32();
        let time_offset = blob.get_u32();
        fingerprints.push(Fingerprint {
            song_id: None,
            hash,
            time_offset,
        });
    }
    fingerprints
}
