//! Viral clip records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::grade::Grade;
use crate::job::JobId;
use crate::moment::MomentCandidate;

/// Unique identifier for a rendered clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    /// Generate a new random clip ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClipId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A rendered viral clip with its analysis metadata.
///
/// Created in bulk by the orchestrator after a successful pipeline run and
/// never mutated afterwards; deletion only happens by cascading job deletion.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViralClip {
    /// Unique clip ID
    pub id: ClipId,

    /// Owning job
    pub job_id: JobId,

    /// Start offset into the source media, seconds
    pub start_seconds: f64,

    /// End offset, seconds
    pub end_seconds: f64,

    /// Virality score on the canonical 0.0-1.0 scale
    pub score: f64,

    /// Letter grade derived from `score`
    pub grade: Grade,

    /// Why this moment was judged notable
    pub justification: String,

    /// Short emotion/hook descriptors
    #[serde(default)]
    pub emotional_keywords: Vec<String>,

    /// Share-urgency descriptors
    #[serde(default)]
    pub urgency_indicators: Vec<String>,

    /// Location of the rendered file (local path or blob URL), set once
    /// extraction succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Rendered file size in bytes
    #[serde(default)]
    pub file_size_bytes: u64,

    /// Rendered resolution as "WxH", when the probe succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl ViralClip {
    /// Build a clip record from a validated moment candidate.
    ///
    /// Media fields start empty; the orchestrator fills them in after
    /// extraction succeeds.
    pub fn from_candidate(job_id: JobId, candidate: &MomentCandidate) -> Self {
        Self {
            id: ClipId::new(),
            job_id,
            start_seconds: candidate.start_seconds,
            end_seconds: candidate.end_seconds,
            score: candidate.score,
            grade: candidate.grade,
            justification: candidate.justification.clone(),
            emotional_keywords: candidate.emotional_keywords.clone(),
            urgency_indicators: candidate.urgency_indicators.clone(),
            media_url: None,
            file_size_bytes: 0,
            resolution: None,
            created_at: Utc::now(),
        }
    }

    /// Clip length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Score on the 0-100 display scale.
    ///
    /// The 0.0-1.0 scale is canonical everywhere internal; this conversion
    /// exists only for the API boundary.
    pub fn display_score(&self) -> u8 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Sort clips into presentation order: score descending, `created_at`
/// ascending as the tiebreak (stable, so equal timestamps keep analyzer
/// insertion order).
pub fn sort_clips(clips: &mut [ViralClip]) {
    clips.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.created_at.cmp(&b.created_at))
    });
}
