//! Processing job definitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::stats::ProcessingStats;
use crate::transcript::SourceVideoInfo;

/// Minimum accepted clip length in seconds.
pub const MIN_CLIP_SECONDS: u32 = 5;

/// Maximum accepted clip length in seconds.
pub const MAX_CLIP_SECONDS: u32 = 60;

/// Unique identifier for a processing job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job lifecycle state.
///
/// Transitions are monotonic: `Pending -> Processing -> {Completed | Failed}`.
/// Terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job has been accepted and is waiting for its worker task
    #[default]
    Pending,
    /// Pipeline is running
    Processing,
    /// Pipeline finished and clips were persisted
    Completed,
    /// Pipeline aborted at some stage
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether moving to `next` respects the monotonic lifecycle.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline stage names used in failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Encoder availability probe, before any network call
    DependencyCheck,
    /// Transcript retrieval from the scraping service
    TranscriptFetch,
    /// AI moment analysis
    Analysis,
    /// Source media download
    MediaFetch,
    /// Per-moment clip extraction
    ClipExtraction,
    /// Job/clip store writes
    Persistence,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::DependencyCheck => "dependency_check",
            PipelineStage::TranscriptFetch => "transcript_fetch",
            PipelineStage::Analysis => "analysis",
            PipelineStage::MediaFetch => "media_fetch",
            PipelineStage::ClipExtraction => "clip_extraction",
            PipelineStage::Persistence => "persistence",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal payload recorded on a job.
///
/// Success and failure payloads are mutually exclusive by status, so they are
/// a single tagged enum rather than two nullable fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Processing statistics plus source-media metadata
    Completed {
        stats: ProcessingStats,
        video: SourceVideoInfo,
    },
    /// The failing stage and the original error text
    Failed {
        stage: PipelineStage,
        message: String,
    },
}

/// A video processing request and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingJob {
    /// Unique job ID
    pub id: JobId,

    /// Source video URL. Immutable after creation.
    pub source_url: String,

    /// Requested clip length in seconds, within [5, 60]. Immutable.
    pub target_clip_seconds: u32,

    /// Current lifecycle state
    #[serde(default)]
    pub status: JobStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Terminal payload, set exactly once when the job finishes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<JobOutcome>,
}

impl ProcessingJob {
    /// Create a new pending job.
    pub fn new(source_url: impl Into<String>, target_clip_seconds: u32) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            source_url: source_url.into(),
            target_clip_seconds,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
            outcome: None,
        }
    }

    /// Mark the job as processing.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as completed with its processing report.
    pub fn complete(mut self, stats: ProcessingStats, video: SourceVideoInfo) -> Self {
        self.status = JobStatus::Completed;
        self.outcome = Some(JobOutcome::Completed { stats, video });
        self.updated_at = Utc::now();
        self
    }

    /// Mark the job as failed, recording the stage and original error text.
    pub fn fail(mut self, stage: PipelineStage, message: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.outcome = Some(JobOutcome::Failed {
            stage,
            message: message.into(),
        });
        self.updated_at = Utc::now();
        self
    }

    /// Failure summary as shown at the API boundary, or `None` when the job
    /// has not failed.
    pub fn error_summary(&self) -> Option<String> {
        match &self.outcome {
            Some(JobOutcome::Failed { stage, message }) => {
                Some(format!("[{}] {}", stage, message))
            }
            _ => None,
        }
    }
}

/// Whether a requested clip length is within the accepted range.
pub fn clip_length_in_range(seconds: u32) -> bool {
    (MIN_CLIP_SECONDS..=MAX_CLIP_SECONDS).contains(&seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_creation() {
        let job = ProcessingJob::new("https://youtube.com/watch?v=abc", 30);
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.outcome.is_none());
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));

        // No shortcuts and no exits from terminal states
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn test_fail_records_stage_and_message() {
        let job = ProcessingJob::new("https://example.com/v", 30)
            .start()
            .fail(PipelineStage::TranscriptFetch, "no captions");

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error_summary().unwrap(),
            "[transcript_fetch] no captions"
        );
    }

    #[test]
    fn test_clip_length_bounds() {
        assert!(!clip_length_in_range(4));
        assert!(clip_length_in_range(5));
        assert!(clip_length_in_range(60));
        assert!(!clip_length_in_range(61));
    }
}
