//! Video processing pipeline.
//!
//! Sequences four unreliable, slow, externally-dependent operations into one
//! job: transcript fetch, AI moment analysis, source download, and per-moment
//! clip extraction. The orchestrator handles partial failure at each stage
//! and produces a ranked, graded result set.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod parse;
pub mod processor;
pub mod transcript;
pub mod validate;

pub use analyzer::{LlmMomentAnalyzer, MomentAnalyzer};
pub use config::{LlmConfig, PipelineConfig, TranscriptConfig};
pub use error::{PipelineError, PipelineResult};
pub use fetcher::{ClipExtractor, FfmpegExtractor, MediaFetcher, YtDlpFetcher};
pub use logging::JobLogger;
pub use processor::PipelineRunner;
pub use transcript::{HttpTranscriptSource, TranscriptSource};
