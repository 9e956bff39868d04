//! Pipeline orchestration.
//!
//! Executes one job end-to-end: availability probe, transcript fetch, AI
//! analysis, media download, per-moment clip extraction, result assembly.
//! Stage order is fixed and any stage error is fatal to the job, except
//! per-clip encode failures which drop only that candidate. The downloaded
//! source media is released exactly once on every exit path; rendered clips
//! are retained.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, warn};

use clipforge_models::{
    sort_clips, JobId, JobOutcome, JobStatus, ProcessingJob, ProcessingStats, SourceVideoInfo,
    ViralClip,
};
use clipforge_storage::BlobStore;
use clipforge_store::JobStore;

use clipforge_media::remove_if_exists;

use crate::analyzer::{LlmMomentAnalyzer, MomentAnalyzer};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::fetcher::{ClipExtractor, FfmpegExtractor, MediaFetcher, YtDlpFetcher};
use crate::logging::JobLogger;
use crate::transcript::{HttpTranscriptSource, TranscriptSource};

/// Runs one job's pipeline end-to-end.
pub struct PipelineRunner {
    config: PipelineConfig,
    transcripts: Arc<dyn TranscriptSource>,
    analyzer: Arc<dyn MomentAnalyzer>,
    fetcher: Arc<dyn MediaFetcher>,
    extractor: Arc<dyn ClipExtractor>,
    store: Arc<dyn JobStore>,
    blob: Option<Arc<BlobStore>>,
}

impl PipelineRunner {
    /// Create a runner with explicit capabilities (the test seam).
    pub fn new(
        config: PipelineConfig,
        transcripts: Arc<dyn TranscriptSource>,
        analyzer: Arc<dyn MomentAnalyzer>,
        fetcher: Arc<dyn MediaFetcher>,
        extractor: Arc<dyn ClipExtractor>,
        store: Arc<dyn JobStore>,
        blob: Option<Arc<BlobStore>>,
    ) -> Self {
        Self {
            config,
            transcripts,
            analyzer,
            fetcher,
            extractor,
            store,
            blob,
        }
    }

    /// Create a runner wired to the real leaf capabilities.
    pub fn from_config(
        config: PipelineConfig,
        store: Arc<dyn JobStore>,
        blob: Option<Arc<BlobStore>>,
    ) -> PipelineResult<Self> {
        let transcripts = Arc::new(HttpTranscriptSource::new(config.transcript.clone())?);
        let analyzer = Arc::new(LlmMomentAnalyzer::new(
            config.llm.clone(),
            config.max_moments,
        )?);
        let fetcher = Arc::new(YtDlpFetcher::new(config.quality_ceiling));
        let extractor = Arc::new(FfmpegExtractor::new(
            config.encode_timeout_secs,
            config.probe_timeout_secs,
        ));

        Ok(Self::new(
            config, transcripts, analyzer, fetcher, extractor, store, blob,
        ))
    }

    /// Run the pipeline for a pending job and record its terminal outcome.
    ///
    /// Never returns an error: every failure ends up on the job record with
    /// the stage it occurred at, which is what the status endpoint serves.
    pub async fn run(&self, job_id: &JobId) {
        let logger = JobLogger::new(job_id, "video_processing");

        let job = match self.store.get_job(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                error!(job_id = %job_id, "Job not found, nothing to run");
                return;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Failed to load job");
                return;
            }
        };

        if job.status != JobStatus::Pending {
            warn!(
                job_id = %job_id,
                status = %job.status,
                "Job is not pending, refusing to run"
            );
            return;
        }

        if let Err(e) = self.store.update_status(job_id, JobStatus::Processing).await {
            error!(job_id = %job_id, error = %e, "Failed to mark job processing");
            return;
        }

        logger.log_start(&format!("processing {}", job.source_url));

        // The fetched source is a scoped resource: acquired at most once,
        // read N times, released exactly once on every exit path below.
        let mut source_media: Option<PathBuf> = None;
        let result = self.execute(&job, &logger, &mut source_media).await;

        if let Some(path) = source_media.take() {
            self.fetcher.release(&path).await;
        }

        let outcome = match result {
            Ok((stats, video)) => {
                logger.log_completion(&format!(
                    "{} clips, average score {:.2}",
                    stats.clips_created, stats.average_score
                ));
                (JobStatus::Completed, JobOutcome::Completed { stats, video })
            }
            Err(e) => {
                logger.log_error(&format!("failed at {}: {}", e.stage(), e));
                (
                    JobStatus::Failed,
                    JobOutcome::Failed {
                        stage: e.stage(),
                        message: e.to_string(),
                    },
                )
            }
        };

        if let Err(e) = self
            .store
            .record_outcome(job_id, outcome.0, outcome.1)
            .await
        {
            error!(job_id = %job_id, error = %e, "Failed to record job outcome");
        }
    }

    /// The fatal-stage sequence. Returns the completed report or the first
    /// fatal error; per-clip extraction failures are handled inside.
    async fn execute(
        &self,
        job: &ProcessingJob,
        logger: &JobLogger,
        source_media: &mut Option<PathBuf>,
    ) -> PipelineResult<(ProcessingStats, SourceVideoInfo)> {
        // Stage 1: precondition probe, before any network call
        if !self.extractor.is_available().await {
            return Err(PipelineError::dependency_unavailable(
                "clip encoder is not installed or not responding",
            ));
        }

        // Stage 2: transcript
        logger.log_progress("fetching transcript");
        let transcript = self.transcripts.fetch_transcript(&job.source_url).await?;
        if transcript.is_empty() {
            return Err(PipelineError::transcript_failed(
                "upstream returned an empty transcript",
            ));
        }

        // Stage 3: analysis
        logger.log_progress("analyzing transcript for viral moments");
        let moments = self
            .analyzer
            .extract_moments(&transcript, job.target_clip_seconds)
            .await?;
        if moments.is_empty() {
            return Err(PipelineError::analysis_failed(
                "analyzer returned no viable moments",
            ));
        }

        // Stage 4: full media fetch
        logger.log_progress("downloading source media");
        let work_dir = self.config.work_dir.join(job.id.as_str());
        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|e| PipelineError::media_failed(format!("cannot create work dir: {}", e)))?;

        let source = self.fetcher.fetch_media(&job.source_url, &work_dir).await?;
        *source_media = Some(source.clone());

        // Stage 5: per-moment extraction; a single failure drops only that
        // candidate
        let clips_dir = work_dir.join("clips");
        let mut clips: Vec<ViralClip> = Vec::new();

        for (index, moment) in moments.iter().enumerate() {
            let filename = format!("clip_{}.mp4", index + 1);
            let output = clips_dir.join(&filename);

            logger.log_progress(&format!(
                "extracting clip {}/{} ({:.1}s - {:.1}s)",
                index + 1,
                moments.len(),
                moment.start_seconds,
                moment.end_seconds
            ));

            let artifact = match self
                .extractor
                .create_clip(&source, moment.start_seconds, moment.end_seconds, &output)
                .await
            {
                Ok(artifact) => artifact,
                Err(e) => {
                    logger.log_warning(&format!("clip {} skipped: {}", index + 1, e));
                    continue;
                }
            };

            let media_url = match &self.blob {
                Some(blob) => {
                    let key = format!("clips/{}/{}", job.id, filename);
                    match blob.put_file(&artifact.path, &key, "video/mp4").await {
                        Ok(url) => {
                            if !self.config.keep_local_clips {
                                remove_if_exists(&artifact.path).await;
                            }
                            url
                        }
                        Err(e) => {
                            logger.log_warning(&format!(
                                "clip {} skipped: upload failed: {}",
                                index + 1,
                                e
                            ));
                            continue;
                        }
                    }
                }
                None => artifact.path.to_string_lossy().to_string(),
            };

            let mut clip = ViralClip::from_candidate(job.id.clone(), moment);
            clip.media_url = Some(media_url);
            clip.file_size_bytes = artifact.file_size_bytes;
            clip.resolution = artifact.resolution;
            clips.push(clip);
        }

        if clips.is_empty() {
            return Err(PipelineError::NoClipsProduced(format!(
                "all {} clip extractions failed",
                moments.len()
            )));
        }

        // Stage 6: assemble and persist the ranked result
        sort_clips(&mut clips);
        self.store.insert_clips(clips.clone()).await?;

        let stats = ProcessingStats::from_clips(moments.len() as u32, &clips);
        let video = SourceVideoInfo::from_transcript(&transcript);

        Ok((stats, video))
    }
}
