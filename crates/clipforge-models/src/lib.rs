//! Shared data models for the ClipForge backend.
//!
//! This crate provides Serde-serializable types for:
//! - Processing jobs and their lifecycle
//! - Viral clips and moment candidates
//! - Virality grades and aggregate statistics
//! - Transcript shapes exchanged between pipeline stages

pub mod clip;
pub mod grade;
pub mod job;
pub mod moment;
pub mod stats;
pub mod transcript;

// Re-export common types
pub use clip::{sort_clips, ClipId, ViralClip};
pub use grade::Grade;
pub use job::{
    JobId, JobOutcome, JobStatus, PipelineStage, ProcessingJob, MAX_CLIP_SECONDS,
    MIN_CLIP_SECONDS,
};
pub use moment::MomentCandidate;
pub use stats::{ProcessingStats, A_GRADE_EQUIVALENT_SCORE};
pub use transcript::{SourceVideoInfo, TranscriptSegment, VideoTranscript};
