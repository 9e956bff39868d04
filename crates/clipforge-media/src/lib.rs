//! FFmpeg/yt-dlp CLI wrappers for video processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with bounded-timeout execution
//! - Clip extraction with web-playback-optimized output
//! - FFprobe metadata inspection
//! - Source video download with a quality ceiling and format fallback

pub mod clip;
pub mod command;
pub mod download;
pub mod error;
pub mod fs;
pub mod probe;

pub use clip::{extract_clip, ClipArtifact, DEFAULT_ENCODE_TIMEOUT_SECS};
pub use command::{
    check_ffmpeg, check_ffprobe, check_ytdlp, encoder_available, FfmpegCommand, FfmpegRunner,
};
pub use download::{download_video, is_supported_url};
pub use error::{MediaError, MediaResult};
pub use fs::remove_if_exists;
pub use probe::{probe_video, VideoInfo, DEFAULT_PROBE_TIMEOUT_SECS};
