//! Configuration module (YAML loading)
//!
//! `ConfigSet` reads one YAML file per concern from a root directory and hands
//! out immutable, validated settings. Every section also has a `Default` equal to
//! the reference tuning, so the pipeline can be built without any files.
mod audio;
mod error;
mod fingerprint;
mod storage;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

pub use audio::*;
pub use error::ConfigError;
pub use fingerprint::*;
pub use storage::*;

/// Environment variable naming the configuration directory
pub const CONFIG_DIR_ENV: &str = "LANDMARK_FP_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSet {
    pub audio: AudioProcessingConfig,
    pub fingerprint: FingerprintConfig,
    pub storage: StorageConfig,
    root: PathBuf,
}

impl ConfigSet {
    /// Load every YAML file below `dir`
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let root = dir.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ConfigError::MissingRoot(root));
        }

        let audio: AudioProcessingConfig = load_yaml(root.join("audio_processing.yaml"))?;
        let fingerprint: FingerprintConfig = load_yaml(root.join("fingerprint.yaml"))?;
        let storage: StorageConfig = load_yaml(root.join("storage.yaml"))?;

        audio.validate()?;
        fingerprint.validate()?;

        Ok(Self {
            audio,
            fingerprint,
            storage,
            root,
        })
    }

    /// Load from the directory named by the environment (`config/` when unset)
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from_dir(dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn load_yaml<T>(path: PathBuf) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = ConfigSet::default();
        assert_eq!(cfg.audio.input.max_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.audio.target.sample_rate_hz, 16_000);
        assert_eq!(cfg.audio.spectrogram.window_size, 2048);
        assert_eq!(cfg.audio.spectrogram.hop_size, 512);
        assert_eq!(cfg.fingerprint.low_band_max, 64);
        assert_eq!(cfg.fingerprint.mid_band_max, 256);
        assert_eq!(cfg.fingerprint.target_zone, 5);
        assert_eq!(cfg.fingerprint.max_pairs_per_peak, 5);
        assert!(cfg.audio.validate().is_ok());
        assert!(cfg.fingerprint.validate().is_ok());
    }

    #[test]
    fn inverted_bands_are_rejected() {
        let cfg = FingerprintConfig {
            low_band_max: 300,
            ..FingerprintConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "low_band_max", .. })
        ));
    }

    #[test]
    fn zero_hop_is_rejected() {
        let mut cfg = AudioProcessingConfig::default();
        cfg.spectrogram.hop_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_root_is_reported() {
        let err = ConfigSet::load_from_dir("does/not/exist").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(_)));
    }

    #[test]
    fn object_key_uses_prefix() {
        let id = uuid::Uuid::nil();
        let key = StorageConfig::default().object_key(&id);
        assert_eq!(key, format!("songs/{}.wav", id));
    }
}
