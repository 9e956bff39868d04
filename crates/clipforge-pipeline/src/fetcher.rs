//! Media fetch and clip extraction capability seams.
//!
//! The orchestrator depends on these traits, not on the CLI wrappers
//! directly, so every failure mode can be injected in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use clipforge_media::{
    download_video, encoder_available, extract_clip, remove_if_exists, ClipArtifact,
};

use crate::error::{PipelineError, PipelineResult};

/// Longest diagnostic tail carried into a job's failure record; full
/// subprocess output stays in the server logs.
const DIAGNOSTIC_TAIL_CHARS: usize = 400;

/// Downloads the full source media for a URL.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the source media into `work_dir`, returning the local path.
    async fn fetch_media(&self, url: &str, work_dir: &Path) -> PipelineResult<PathBuf>;

    /// Release a previously fetched artifact. Idempotent, never fails.
    async fn release(&self, path: &Path);
}

/// Cuts a sub-range of a media file into a standalone output.
#[async_trait]
pub trait ClipExtractor: Send + Sync {
    /// Fast capability probe; must not error.
    async fn is_available(&self) -> bool;

    /// Extract `[start_secs, end_secs)` of `source` into `output`.
    async fn create_clip(
        &self,
        source: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> PipelineResult<ClipArtifact>;
}

/// Media fetcher backed by yt-dlp.
pub struct YtDlpFetcher {
    quality_ceiling: u32,
}

impl YtDlpFetcher {
    pub fn new(quality_ceiling: u32) -> Self {
        Self { quality_ceiling }
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch_media(&self, url: &str, work_dir: &Path) -> PipelineResult<PathBuf> {
        let output = work_dir.join("source.mp4");

        download_video(url, &output, self.quality_ceiling)
            .await
            .map_err(|e| PipelineError::media_failed(e.to_string()))?;

        if !output.exists() {
            return Err(PipelineError::media_failed(
                "download reported success but output is missing",
            ));
        }

        Ok(output)
    }

    async fn release(&self, path: &Path) {
        remove_if_exists(path).await;
    }
}

/// Clip extractor backed by the FFmpeg CLI.
pub struct FfmpegExtractor {
    encode_timeout_secs: u64,
    probe_timeout_secs: u64,
}

impl FfmpegExtractor {
    pub fn new(encode_timeout_secs: u64, probe_timeout_secs: u64) -> Self {
        Self {
            encode_timeout_secs,
            probe_timeout_secs,
        }
    }
}

#[async_trait]
impl ClipExtractor for FfmpegExtractor {
    async fn is_available(&self) -> bool {
        encoder_available().await
    }

    async fn create_clip(
        &self,
        source: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> PipelineResult<ClipArtifact> {
        extract_clip(
            source,
            output,
            start_secs,
            end_secs,
            self.encode_timeout_secs,
            self.probe_timeout_secs,
        )
        .await
        .map_err(|e| {
            if let Some(stderr) = e.diagnostic() {
                warn!(output = %output.display(), stderr = %stderr, "Encoder diagnostics");
            }
            PipelineError::encode_failed(describe_media_error(&e))
        })
    }
}

/// Render a media error with a bounded diagnostic tail.
fn describe_media_error(e: &clipforge_media::MediaError) -> String {
    match e.diagnostic() {
        Some(stderr) => {
            let tail: String = stderr
                .trim()
                .chars()
                .rev()
                .take(DIAGNOSTIC_TAIL_CHARS)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{} ({})", e, tail)
        }
        None => e.to_string(),
    }
}
