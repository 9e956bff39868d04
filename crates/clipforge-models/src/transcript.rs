//! Transcript shapes exchanged between pipeline stages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timestamped line of a transcript, in ascending offset order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Offset into the source media, seconds
    pub offset_seconds: f64,

    /// Caption text for this segment
    pub text: String,
}

/// A normalized transcript for one source video.
///
/// Upstream scrapers return heterogeneous shapes; the transcript source is
/// responsible for normalizing them into this one before anything else sees
/// the data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoTranscript {
    /// Upstream video identifier, when the scraper reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    /// Video title
    pub title: String,

    /// Total source duration in seconds. Synthesized from the last segment
    /// offset when the upstream omits it.
    pub duration_seconds: f64,

    /// Timestamped segments in ascending offset order
    pub segments: Vec<TranscriptSegment>,
}

impl VideoTranscript {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total characters of caption text, used in processing stats.
    pub fn transcript_chars(&self) -> usize {
        self.segments.iter().map(|s| s.text.len()).sum()
    }
}

/// Source-media metadata recorded on a completed job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceVideoInfo {
    /// Video title
    pub title: String,

    /// Source duration in seconds
    pub duration_seconds: f64,

    /// Number of transcript segments analyzed
    pub transcript_segments: u32,

    /// Total transcript length in characters
    pub transcript_chars: u32,
}

impl SourceVideoInfo {
    pub fn from_transcript(transcript: &VideoTranscript) -> Self {
        Self {
            title: transcript.title.clone(),
            duration_seconds: transcript.duration_seconds,
            transcript_segments: transcript.segments.len() as u32,
            transcript_chars: transcript.transcript_chars() as u32,
        }
    }
}
