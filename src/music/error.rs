use thiserror::Error;

use crate::audio_pipeline::PipelineError;
use crate::repository::RepositoryError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("audio processing failed: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("object storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("processing worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
