//! Job submission, status polling, results, and history.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use clipforge_models::{
    JobId, JobOutcome, JobStatus, ProcessingJob, ProcessingStats, SourceVideoInfo,
};

use crate::error::{ApiError, ApiResult};
use crate::handlers::{ClipView, StatsView};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

/// Job submission body.
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub youtube_url: String,

    #[validate(range(
        min = 5,
        max = 60,
        message = "Clip duration must be between 5 and 60 seconds"
    ))]
    #[serde(default = "default_clip_duration")]
    pub clip_duration: u32,
}

fn default_clip_duration() -> u32 {
    30
}

#[derive(Debug, Serialize)]
pub struct ProcessVideoResponse {
    pub success: bool,
    pub processing_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
    /// Present only for failed jobs: human-readable summary with stage tag
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_clips: usize,
    pub processing_stats: Option<StatsView>,
    pub video_info: Option<SourceVideoInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    12
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total_clips: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub success: bool,
    pub processing_id: String,
    pub status: String,
    pub clips: Vec<ClipView>,
    pub pagination: Pagination,
    pub analytics: StatsView,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub processing_id: String,
    pub source_url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub target_clip_seconds: u32,
    pub total_clips: usize,
    pub best_score: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct HistoryStats {
    pub total_processed: usize,
    pub successful_processings: usize,
    pub total_clips_generated: usize,
    pub avg_clips_per_video: f64,
    pub success_percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub jobs: Vec<JobSummary>,
    pub stats: HistoryStats,
}

/// First human-readable message out of a validation failure.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request".to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/process
///
/// Accept a job and return its ID immediately; the pipeline runs on a
/// background task and progress is observed via the status endpoint.
pub async fn process_video(
    State(state): State<AppState>,
    Json(payload): Json<ProcessVideoRequest>,
) -> ApiResult<Json<ProcessVideoResponse>> {
    if payload.youtube_url.trim().is_empty() {
        return Err(ApiError::bad_request("YouTube URL is required"));
    }

    if url::Url::parse(payload.youtube_url.trim()).is_err() {
        return Err(ApiError::bad_request("Invalid video URL"));
    }

    if let Err(errors) = payload.validate() {
        return Err(ApiError::bad_request(first_validation_message(&errors)));
    }

    let job = ProcessingJob::new(payload.youtube_url.trim(), payload.clip_duration);
    let job_id = job.id.clone();
    state.store.create_job(job).await?;

    info!(
        job_id = %job_id,
        duration = payload.clip_duration,
        "Accepted processing job"
    );

    let runner = state.runner.clone();
    let run_id = job_id.clone();
    let handle = tokio::spawn(async move {
        runner.run(&run_id).await;
    });
    state.tasks.lock().await.insert(job_id.clone(), handle);

    Ok(Json(ProcessVideoResponse {
        success: true,
        processing_id: job_id.to_string(),
        message: "Video processing started".to_string(),
    }))
}

/// GET /api/status/:id
pub async fn processing_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let job_id = JobId::from(id);
    let job = state
        .store
        .get_job(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Processing job not found"))?;

    let total_clips = state.store.clips_for_job(&job_id).await?.len();

    let (processing_stats, video_info) = match &job.outcome {
        Some(JobOutcome::Completed { stats, video }) => {
            (Some(StatsView::from_stats(stats)), Some(video.clone()))
        }
        _ => (None, None),
    };

    Ok(Json(StatusResponse {
        success: true,
        status: job.status.as_str().to_string(),
        error_message: job.error_summary(),
        created_at: job.created_at,
        total_clips,
        processing_stats,
        video_info,
    }))
}

/// GET /api/results/:id
///
/// Paginated, descending-score-ordered clip list plus job-level aggregates.
pub async fn processing_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<Json<ResultsResponse>> {
    let job_id = JobId::from(id);
    let job = state
        .store
        .get_job(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Processing job not found"))?;

    let clips = state.store.clips_for_job(&job_id).await?;
    let total_clips = clips.len();

    let per_page = query.per_page.clamp(1, 50);
    let page = query.page.max(1);
    let total_pages = total_clips.div_ceil(per_page).max(1);

    let page_clips: Vec<ClipView> = clips
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(ClipView::from_clip)
        .collect();

    // Prefer the stats frozen at completion; recompute for jobs that are
    // still running or failed with partial data
    let analytics = match &job.outcome {
        Some(JobOutcome::Completed { stats, .. }) => StatsView::from_stats(stats),
        _ => StatsView::from_stats(&ProcessingStats::from_clips(total_clips as u32, &clips)),
    };

    Ok(Json(ResultsResponse {
        success: true,
        processing_id: job_id.to_string(),
        status: job.status.as_str().to_string(),
        clips: page_clips,
        pagination: Pagination {
            page,
            per_page,
            total_clips,
            total_pages,
        },
        analytics,
    }))
}

/// GET /api/history
///
/// All jobs with per-job clip counts and overall aggregates.
pub async fn processing_history(
    State(state): State<AppState>,
) -> ApiResult<Json<HistoryResponse>> {
    let jobs = state.store.list_jobs().await?;

    let mut summaries = Vec::with_capacity(jobs.len());
    let mut total_clips_generated = 0usize;

    for job in &jobs {
        let clips = state.store.clips_for_job(&job.id).await?;
        total_clips_generated += clips.len();

        summaries.push(JobSummary {
            processing_id: job.id.to_string(),
            source_url: job.source_url.clone(),
            status: job.status.as_str().to_string(),
            created_at: job.created_at,
            target_clip_seconds: job.target_clip_seconds,
            total_clips: clips.len(),
            // Clips arrive sorted, so the first one carries the best score
            best_score: clips.first().map(|c| c.display_score()),
        });
    }

    let total_processed = jobs.len();
    let successful_processings = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Completed)
        .count();

    let avg_clips_per_video = if successful_processings > 0 {
        (total_clips_generated as f64 / successful_processings as f64 * 10.0).round() / 10.0
    } else {
        0.0
    };

    let success_percentage = if total_processed > 0 {
        (successful_processings as f64 / total_processed as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(Json(HistoryResponse {
        success: true,
        jobs: summaries,
        stats: HistoryStats {
            total_processed,
            successful_processings,
            total_clips_generated,
            avg_clips_per_video,
            success_percentage,
        },
    }))
}
