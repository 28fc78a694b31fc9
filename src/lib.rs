pub mod audio_pipeline;
pub mod config;
pub mod fingerprint;
pub mod music;
pub mod repository;
pub mod storage;

pub use config::ConfigSet;
