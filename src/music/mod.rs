//! Upload and lookup orchestration over the catalog seams
mod error;

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio_pipeline::{AudioMetadata, AudioPipeline, AudioProcessor, PipelineError};
use crate::config::{ConfigSet, StorageConfig};
use crate::fingerprint::{self, Fingerprint, FingerprintGenerator, LandmarkFingerprinter};
use crate::repository::{FingerprintRepository, InMemoryCatalog, Song, SongRepository};
use crate::storage::{InMemoryObjectStore, ObjectStore};

pub use error::MusicError;

/// Song details supplied alongside the WAV bytes
#[derive(Debug, Clone)]
pub struct SongUpload {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: i32,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub song_id: Uuid,
    pub storage_key: String,
    pub metadata: AudioMetadata,
    pub fingerprint_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentifyOutcome {
    NoMatch,
    /// Songs sharing at least one hash with the sample, in first-seen order;
    /// no scoring has been applied
    Unranked { candidates: Vec<Uuid> },
}

pub struct MusicService {
    processor: Arc<dyn AudioProcessor>,
    fingerprinter: Arc<dyn FingerprintGenerator>,
    songs: Arc<dyn SongRepository>,
    fingerprints: Arc<dyn FingerprintRepository>,
    store: Arc<dyn ObjectStore>,
    storage: StorageConfig,
}

impl MusicService {
    pub fn new(
        processor: Arc<dyn AudioProcessor>,
        fingerprinter: Arc<dyn FingerprintGenerator>,
        songs: Arc<dyn SongRepository>,
        fingerprints: Arc<dyn FingerprintRepository>,
        store: Arc<dyn ObjectStore>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            processor,
            fingerprinter,
            songs,
            fingerprints,
            store,
            storage,
        }
    }

    /// Service over a fresh in-memory catalog and object store
    pub fn in_memory(config: &ConfigSet) -> Result<Self, PipelineError> {
        let catalog = Arc::new(InMemoryCatalog::new());
        Ok(Self::new(
            Arc::new(AudioPipeline::new(&config.audio)?),
            Arc::new(LandmarkFingerprinter::new(&config.fingerprint)),
            catalog.clone(),
            catalog,
            Arc::new(InMemoryObjectStore::new()),
            config.storage.clone(),
        ))
    }

    pub async fn handle_upload(&self, upload: SongUpload) -> Result<UploadReceipt, MusicError> {
        let (metadata, fingerprints) = self.fingerprint_bytes(upload.data.clone()).await?;

        let song_id = Uuid::new_v4();
        let storage_key = self.storage.object_key(&song_id);
        self.store.upload(&storage_key, upload.data).await?;
        debug!(key = %storage_key, "uploaded source audio");

        let song = Song {
            id: song_id,
            title: upload.title,
            artist: upload.artist,
            album: upload.album,
            year: upload.year,
            s3_key: storage_key.clone(),
            fingerprint_blob: fingerprint::encode_blob(&fingerprints).to_vec(),
            created_at: Utc::now(),
        };
        if let Err(err) = self.songs.save_song(song).await {
            self.discard_object(&storage_key).await;
            return Err(err.into());
        }

        let owned: Vec<Fingerprint> = fingerprints
            .iter()
            .map(|fp| fp.with_song_id(song_id))
            .collect();
        if let Err(err) = self.fingerprints.save_fingerprints(&owned).await {
            if let Err(cleanup) = self.songs.delete_song(song_id).await {
                warn!(song_id = %song_id, error = %cleanup, "failed to remove orphaned song");
            }
            self.discard_object(&storage_key).await;
            return Err(err.into());
        }

        info!(
            song_id = %song_id,
            key = %storage_key,
            fingerprints = owned.len(),
            "song ingested"
        );
        Ok(UploadReceipt {
            song_id,
            storage_key,
            metadata,
            fingerprint_count: owned.len(),
        })
    }

    /// Collect every stored song sharing a hash with `sample`
    pub async fn identify(&self, sample: Bytes) -> Result<IdentifyOutcome, MusicError> {
        let (_, fingerprints) = self.fingerprint_bytes(sample).await?;

        let mut seen_hashes = HashSet::new();
        let mut seen_songs = HashSet::new();
        let mut candidates = Vec::new();
        for fp in &fingerprints {
            if !seen_hashes.insert(fp.hash) {
                continue;
            }
            for row in self.fingerprints.find_by_hash(fp.hash).await? {
                if seen_songs.insert(row.song_id) {
                    candidates.push(row.song_id);
                }
            }
        }

        info!(
            sample_fingerprints = fingerprints.len(),
            candidates = candidates.len(),
            "identify finished"
        );
        if candidates.is_empty() {
            Ok(IdentifyOutcome::NoMatch)
        } else {
            Ok(IdentifyOutcome::Unranked { candidates })
        }
    }

    async fn discard_object(&self, key: &str) {
        if let Err(cleanup) = self.store.delete(key).await {
            warn!(key = %key, error = %cleanup, "failed to remove orphaned object");
        }
    }

    async fn fingerprint_bytes(
        &self,
        data: Bytes,
    ) -> Result<(AudioMetadata, Vec<Fingerprint>), MusicError> {
        let processor = self.processor.clone();
        let fingerprinter = self.fingerprinter.clone();

        let result = tokio::task::spawn_blocking(move || {
            processor.process(&data).map(|audio| {
                let fingerprints = fingerprinter.generate(&audio.spectrogram);
                (audio.metadata, fingerprints)
            })
        })
        .await?;
        Ok(result?)
    }
}
