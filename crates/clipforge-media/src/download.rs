//! Source video download using yt-dlp.
//!
//! Downloads are capped at a quality ceiling to bound processing cost, and
//! every download attempts a fallback format selector before failing since
//! upstream platforms intermittently reject the first-choice format.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};
use crate::fs::remove_if_exists;

/// Build the ordered format-selector chain for a height ceiling.
///
/// The first entry prefers mp4 under the ceiling; the plain `best` fallback
/// exists because some sources reject constrained selectors outright.
fn format_chain(quality_ceiling: u32) -> [String; 2] {
    [
        format!(
            "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best[height<={h}]",
            h = quality_ceiling
        ),
        "best".to_string(),
    ]
}

/// Download a video from `url` to `output_path`, capped at
/// `quality_ceiling` pixels of height.
///
/// Partial output is always cleaned up on failure.
pub async fn download_video(
    url: &str,
    output_path: impl AsRef<Path>,
    quality_ceiling: u32,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    check_ytdlp()?;

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!(
        "Downloading video from {} to {} (ceiling {}p)",
        url,
        output_path.display(),
        quality_ceiling
    );

    let output_path_str = output_path.to_string_lossy().to_string();
    let mut last_error: Option<MediaError> = None;

    for (attempt, format) in format_chain(quality_ceiling).iter().enumerate() {
        if attempt > 0 {
            warn!(
                url = %url,
                format = %format,
                "Retrying download with fallback format selector"
            );
        }

        let result = Command::new("yt-dlp")
            .args([
                "--no-playlist",
                "--no-warnings",
                "--merge-output-format",
                "mp4",
                "-f",
                format.as_str(),
                "-o",
                output_path_str.as_str(),
            ])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                cleanup_partial(output_path).await;
                last_error = Some(MediaError::download_failed(format!(
                    "Failed to run yt-dlp: {}",
                    e
                )));
                continue;
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            cleanup_partial(output_path).await;
            last_error = Some(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                stderr.lines().last().unwrap_or("Unknown error")
            )));
            continue;
        }

        // A zero exit with no output file still counts as a failure
        if !output_path.exists() {
            last_error = Some(MediaError::download_failed("Output file not created"));
            continue;
        }

        let file_size = output_path.metadata()?.len();
        info!(
            output = %output_path.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded video successfully"
        );
        return Ok(());
    }

    cleanup_partial(output_path).await;
    Err(last_error.unwrap_or_else(|| MediaError::download_failed("All format selectors failed")))
}

/// Remove the output and any yt-dlp partial next to it.
async fn cleanup_partial(output_path: &Path) {
    remove_if_exists(output_path).await;

    let mut part = output_path.as_os_str().to_os_string();
    part.push(".part");
    remove_if_exists(Path::new(&part)).await;
}

/// Check if a URL is a supported video platform.
pub fn is_supported_url(url: &str) -> bool {
    let supported_domains = [
        "youtube.com",
        "youtu.be",
        "vimeo.com",
        "twitter.com",
        "x.com",
        "twitch.tv",
        "tiktok.com",
    ];

    supported_domains.iter().any(|domain| url.contains(domain))
}
