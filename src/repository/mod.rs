//! Catalog persistence seams
//!
//! Songs and fingerprints are stored behind async traits so a relational
//! backend can be plugged in; `InMemoryCatalog` implements both for tests and
//! the command-line tool.
mod error;
mod in_memory;
mod models;

use async_trait::async_trait;
use uuid::Uuid;

use crate::fingerprint::Fingerprint;

pub use error::RepositoryError;
pub use in_memory::InMemoryCatalog;
pub use models::{Song, StoredFingerprint, MIN_SONG_YEAR};

#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Validate and persist a new song
    async fn save_song(&self, song: Song) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>, RepositoryError>;

    /// Remove a song together with every fingerprint row it owns
    async fn delete_song(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// First stored song owning a fingerprint with `hash`
    async fn find_by_fingerprint(&self, hash: u32) -> Result<Option<Song>, RepositoryError>;
}

#[async_trait]
pub trait FingerprintRepository: Send + Sync {
    /// Persist one fingerprint and return its assigned id
    async fn save_fingerprint(&self, fingerprint: Fingerprint) -> Result<i64, RepositoryError>;

    /// Persist a batch in order; either every row is stored or none is
    async fn save_fingerprints(
        &self,
        fingerprints: &[Fingerprint],
    ) -> Result<Vec<i64>, RepositoryError>;

    /// Every stored row with `hash`, in insertion order
    async fn find_by_hash(&self, hash: u32) -> Result<Vec<StoredFingerprint>, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFingerprint>, RepositoryError>;

    async fn find_by_song_id(
        &self,
        song_id: Uuid,
    ) -> Result<Vec<StoredFingerprint>, RepositoryError>;
}
