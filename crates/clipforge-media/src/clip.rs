//! Clip extraction.
//!
//! Cuts a sub-range of a source file into a standalone output, re-encoding
//! to H.264/AAC with the moov atom first so partial downloads are streamable.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Default timeout for the encode subprocess.
pub const DEFAULT_ENCODE_TIMEOUT_SECS: u64 = 300;

/// A successfully rendered clip and its technical metadata.
#[derive(Debug, Clone)]
pub struct ClipArtifact {
    /// Output file location
    pub path: PathBuf,
    /// Rendered size in bytes
    pub file_size_bytes: u64,
    /// Clip length in seconds
    pub duration_seconds: f64,
    /// "WxH", or `None` when the resolution probe failed
    pub resolution: Option<String>,
}

/// Extract `[start_secs, end_secs)` of `input` into `output`.
///
/// Preconditions: `0 <= start_secs < end_secs` and `input` exists. The
/// output is re-encoded (libx264/aac, preset fast, crf 23) with faststart
/// layout. Resolution lookup failure is non-fatal and recorded as unknown.
pub async fn extract_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start_secs: f64,
    end_secs: f64,
    encode_timeout_secs: u64,
    probe_timeout_secs: u64,
) -> MediaResult<ClipArtifact> {
    let input = input.as_ref();
    let output = output.as_ref();

    if start_secs < 0.0 || start_secs >= end_secs {
        return Err(MediaError::InvalidRange(format!(
            "start {:.3} must be >= 0 and < end {:.3}",
            start_secs, end_secs
        )));
    }

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let duration = end_secs - start_secs;

    info!(
        "Extracting clip: {} -> {} ({:.2}s - {:.2}s)",
        input.display(),
        output.display(),
        start_secs,
        end_secs
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(duration)
        .video_codec("libx264")
        .audio_codec("aac")
        .preset("fast")
        .crf(23)
        .faststart()
        .zero_timestamps();

    FfmpegRunner::new()
        .with_timeout(encode_timeout_secs)
        .run(&cmd)
        .await?;

    if !output.exists() {
        return Err(MediaError::encode_failed(
            "Output file not created",
            None,
            None,
        ));
    }

    let file_size_bytes = output.metadata()?.len();
    if file_size_bytes == 0 {
        return Err(MediaError::encode_failed("Output file is empty", None, None));
    }

    // Resolution lookup is best-effort
    let resolution = match probe_video(output, probe_timeout_secs).await {
        Ok(info) => Some(info.resolution()),
        Err(e) => {
            warn!(
                output = %output.display(),
                error = %e,
                "Failed to probe clip resolution"
            );
            None
        }
    };

    info!(
        output = %output.display(),
        size_bytes = file_size_bytes,
        resolution = resolution.as_deref().unwrap_or("unknown"),
        "Clip created"
    );

    Ok(ClipArtifact {
        path: output.to_path_buf(),
        file_size_bytes,
        duration_seconds: duration,
        resolution,
    })
}
