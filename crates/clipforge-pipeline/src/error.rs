//! Pipeline error taxonomy.
//!
//! Every variant maps to the pipeline stage recorded on a failed job, so
//! operators always see where a flaky dependency broke the run.

use thiserror::Error;

use clipforge_models::PipelineStage;
use clipforge_store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad input; surfaces as 4xx at the API boundary
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required tool/service is not reachable (e.g. encoder missing)
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetchFailed(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Media fetch failed: {0}")]
    MediaFetchFailed(String),

    /// Per-clip encode failure; recoverable at job level
    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    /// Every per-clip attempt failed
    #[error("No clips produced: {0}")]
    NoClipsProduced(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] StoreError),
}

impl PipelineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn dependency_unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    pub fn transcript_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptFetchFailed(msg.into())
    }

    pub fn analysis_failed(msg: impl Into<String>) -> Self {
        Self::AnalysisFailed(msg.into())
    }

    pub fn media_failed(msg: impl Into<String>) -> Self {
        Self::MediaFetchFailed(msg.into())
    }

    pub fn encode_failed(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }

    /// The pipeline stage this error is attributed to in failure reporting.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::InvalidArgument(_) => PipelineStage::Analysis,
            PipelineError::DependencyUnavailable(_) => PipelineStage::DependencyCheck,
            PipelineError::TranscriptFetchFailed(_) => PipelineStage::TranscriptFetch,
            PipelineError::AnalysisFailed(_) => PipelineStage::Analysis,
            PipelineError::MediaFetchFailed(_) => PipelineStage::MediaFetch,
            PipelineError::EncodeFailed(_) => PipelineStage::ClipExtraction,
            PipelineError::NoClipsProduced(_) => PipelineStage::ClipExtraction,
            PipelineError::PersistenceFailed(_) => PipelineStage::Persistence,
        }
    }
}
