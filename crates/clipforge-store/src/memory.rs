//! In-memory job table.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use clipforge_models::{
    sort_clips, ClipId, JobId, JobOutcome, JobStatus, ProcessingJob, ViralClip,
};

use crate::error::{StoreError, StoreResult};
use crate::JobStore;

/// Synchronized in-memory job/clip tables.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, ProcessingJob>>,
    clips: RwLock<HashMap<ClipId, ViralClip>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job(&self, job: ProcessingJob) -> StoreResult<()> {
        self.jobs.write().await.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get_job(&self, id: &JobId) -> StoreResult<Option<ProcessingJob>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn update_status(&self, id: &JobId, status: JobStatus) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;

        if !job.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: job.status,
                to: status,
            });
        }

        job.status = status;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn record_outcome(
        &self,
        id: &JobId,
        status: JobStatus,
        outcome: JobOutcome,
    ) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound(id.to_string()))?;

        if !job.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: job.status,
                to: status,
            });
        }

        job.status = status;
        job.outcome = Some(outcome);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_clips(&self, clips: Vec<ViralClip>) -> StoreResult<()> {
        let mut table = self.clips.write().await;
        for clip in clips {
            table.insert(clip.id.clone(), clip);
        }
        Ok(())
    }

    async fn clips_for_job(&self, id: &JobId) -> StoreResult<Vec<ViralClip>> {
        let mut clips: Vec<ViralClip> = self
            .clips
            .read()
            .await
            .values()
            .filter(|c| &c.job_id == id)
            .cloned()
            .collect();
        sort_clips(&mut clips);
        Ok(clips)
    }

    async fn get_clip(&self, id: &ClipId) -> StoreResult<Option<ViralClip>> {
        Ok(self.clips.read().await.get(id).cloned())
    }

    async fn list_jobs(&self) -> StoreResult<Vec<ProcessingJob>> {
        let mut jobs: Vec<ProcessingJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn delete_job(&self, id: &JobId) -> StoreResult<()> {
        let removed = self.jobs.write().await.remove(id);
        if removed.is_none() {
            return Err(StoreError::JobNotFound(id.to_string()));
        }

        // Cascade
        self.clips.write().await.retain(|_, c| &c.job_id != id);
        Ok(())
    }
}
