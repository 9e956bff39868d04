//! Job/clip store contract and in-memory implementation.
//!
//! The store is the only mutable state shared between the API layer and a
//! job's worker task. Each job record is written solely by its own worker
//! once processing starts, so the synchronized table needs no per-job
//! locking beyond the map's own.

pub mod error;
pub mod memory;

use async_trait::async_trait;

use clipforge_models::{ClipId, JobId, JobOutcome, JobStatus, ProcessingJob, ViralClip};

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryJobStore;

/// Persistence contract for jobs and clips.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a newly created job record.
    async fn create_job(&self, job: ProcessingJob) -> StoreResult<()>;

    /// Fetch a job by ID.
    async fn get_job(&self, id: &JobId) -> StoreResult<Option<ProcessingJob>>;

    /// Advance a job's status. Enforces the monotonic lifecycle.
    async fn update_status(&self, id: &JobId, status: JobStatus) -> StoreResult<()>;

    /// Record a terminal status together with its outcome payload.
    async fn record_outcome(
        &self,
        id: &JobId,
        status: JobStatus,
        outcome: JobOutcome,
    ) -> StoreResult<()>;

    /// Persist clips in bulk after a successful pipeline run.
    async fn insert_clips(&self, clips: Vec<ViralClip>) -> StoreResult<()>;

    /// Clips for a job in presentation order (score desc, created_at asc).
    async fn clips_for_job(&self, id: &JobId) -> StoreResult<Vec<ViralClip>>;

    /// Fetch a single clip.
    async fn get_clip(&self, id: &ClipId) -> StoreResult<Option<ViralClip>>;

    /// All jobs, newest first.
    async fn list_jobs(&self) -> StoreResult<Vec<ProcessingJob>>;

    /// Delete a job and cascade-delete its clips.
    async fn delete_job(&self, id: &JobId) -> StoreResult<()>;
}
