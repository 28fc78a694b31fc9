use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid song: {0}")]
    InvalidSong(String),
    #[error("song {0} already exists")]
    Duplicate(Uuid),
    #[error("fingerprint is not attached to a song")]
    MissingSongId,
    #[error("song {0} does not exist")]
    UnknownSong(Uuid),
    /// Raised by database-backed implementations; `InMemoryCatalog` never returns it
    #[error("repository backend failure: {0}")]
    Backend(String),
}
