//! Pipeline configuration.
//!
//! Built once at process start and injected into each capability
//! constructor; leaf logic never reads the environment itself.

use std::path::PathBuf;

use clipforge_media::{DEFAULT_ENCODE_TIMEOUT_SECS, DEFAULT_PROBE_TIMEOUT_SECS};

/// Language-model endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat-completions base URL
    pub api_url: String,
    /// Bearer token
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token budget
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.x.ai".to_string(),
            api_key: String::new(),
            model: "grok-3-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 90,
        }
    }
}

/// Transcript-scraping service configuration.
#[derive(Debug, Clone)]
pub struct TranscriptConfig {
    /// Service endpoint URL
    pub api_url: String,
    /// Bearer token, empty when the service is unauthenticated
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Language-model endpoint
    pub llm: LlmConfig,
    /// Transcript service
    pub transcript: TranscriptConfig,
    /// Maximum candidates returned per analysis
    pub max_moments: usize,
    /// Encode subprocess timeout
    pub encode_timeout_secs: u64,
    /// Metadata-probe subprocess timeout
    pub probe_timeout_secs: u64,
    /// Download quality ceiling in pixels of height
    pub quality_ceiling: u32,
    /// Work directory for per-job temporary files and rendered clips
    pub work_dir: PathBuf,
    /// Keep rendered clips on local disk after a blob upload
    pub keep_local_clips: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            transcript: TranscriptConfig::default(),
            max_moments: 5,
            encode_timeout_secs: DEFAULT_ENCODE_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            quality_ceiling: 720,
            work_dir: PathBuf::from("/tmp/clipforge"),
            keep_local_clips: true,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            llm: LlmConfig {
                api_url: std::env::var("LLM_API_URL").unwrap_or(defaults.llm.api_url),
                api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
                model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm.model),
                temperature: std::env::var("LLM_TEMPERATURE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.llm.temperature),
                max_tokens: std::env::var("LLM_MAX_TOKENS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.llm.max_tokens),
                timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.llm.timeout_secs),
            },
            transcript: TranscriptConfig {
                api_url: std::env::var("TRANSCRIPT_API_URL").unwrap_or_default(),
                api_key: std::env::var("TRANSCRIPT_API_KEY").unwrap_or_default(),
                timeout_secs: std::env::var("TRANSCRIPT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.transcript.timeout_secs),
            },
            max_moments: std::env::var("PIPELINE_MAX_MOMENTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_moments),
            encode_timeout_secs: std::env::var("ENCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.encode_timeout_secs),
            probe_timeout_secs: std::env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.probe_timeout_secs),
            quality_ceiling: std::env::var("DOWNLOAD_MAX_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.quality_ceiling),
            work_dir: std::env::var("PIPELINE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            keep_local_clips: std::env::var("KEEP_LOCAL_CLIPS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.keep_local_clips),
        }
    }
}
