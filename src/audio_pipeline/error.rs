use std::fmt;

use thiserror::Error;

/// Input rejected before any parsing was attempted
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty input")]
    Empty,
    #[error("input of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// The RIFF/WAVE container could not be parsed as linear PCM
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read WAV header")]
    Header(#[source] hound::Error),
    #[error("unsupported audio encoding: {format}")]
    UnsupportedEncoding { format: String },
    #[error("invalid format chunk: {message}")]
    InvalidFormat { message: String },
    #[error("RIFF container has no data chunk")]
    MissingDataChunk,
    #[error("data chunk declares {declared} bytes but only {available} are present")]
    Truncated { declared: usize, available: usize },
    #[error("data chunk declares {declared} frames but the decoder reports {decoded}")]
    FrameCountMismatch { declared: u64, decoded: u64 },
    #[error("failed to read sample {index}")]
    Samples {
        index: usize,
        #[source]
        source: hound::Error,
    },
}

/// Numerical or buffer failure inside a processing stage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },
    #[error("malformed buffer: {message}")]
    MalformedBuffer { message: String },
}

impl StageError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBuffer {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Mixdown,
    Resample,
    Normalize,
    Spectrogram,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Mixdown => "mixdown",
            Stage::Resample => "resample",
            Stage::Normalize => "normalize",
            Stage::Spectrogram => "spectrogram",
        };
        f.write_str(name)
    }
}

/// Coarse classification callers use to pick a user-visible response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Decode,
    Stage,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    pub(crate) fn stage(stage: Stage) -> impl FnOnce(StageError) -> Self {
        move |source| Self::Stage { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Decode(_) => ErrorKind::Decode,
            PipelineError::Stage { .. } => ErrorKind::Stage,
        }
    }
}
