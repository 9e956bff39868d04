//! Aggregate processing statistics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clip::ViralClip;
use crate::grade::Grade;

/// Canonical-scale score at or above which a clip counts toward the success
/// rate. Matches the original 0-100-scale threshold of 80.
pub const A_GRADE_EQUIVALENT_SCORE: f64 = 0.80;

/// Aggregate result of one pipeline run, recorded on the completed job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingStats {
    /// Candidates the analyzer produced
    pub total_candidates: u32,

    /// Clips successfully extracted and persisted
    pub clips_created: u32,

    /// Candidates whose extraction failed and was skipped
    pub clips_failed: u32,

    /// Mean virality score of persisted clips, canonical 0.0-1.0 scale
    pub average_score: f64,

    /// Best grade among persisted clips
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_grade: Option<Grade>,

    /// Clip count per letter grade
    pub grade_distribution: BTreeMap<String, u32>,

    /// Fraction of clips at or above the A-grade-equivalent score
    pub success_rate: f64,
}

impl ProcessingStats {
    /// Compute stats over the clips that survived extraction.
    pub fn from_clips(total_candidates: u32, clips: &[ViralClip]) -> Self {
        let clips_created = clips.len() as u32;
        let clips_failed = total_candidates.saturating_sub(clips_created);

        let average_score = if clips.is_empty() {
            0.0
        } else {
            clips.iter().map(|c| c.score).sum::<f64>() / clips.len() as f64
        };

        let top_grade = clips.iter().map(|c| c.grade).max();

        let mut grade_distribution = BTreeMap::new();
        for clip in clips {
            *grade_distribution
                .entry(clip.grade.as_str().to_string())
                .or_insert(0) += 1;
        }

        let success_rate = if clips.is_empty() {
            0.0
        } else {
            clips
                .iter()
                .filter(|c| c.score >= A_GRADE_EQUIVALENT_SCORE)
                .count() as f64
                / clips.len() as f64
        };

        Self {
            total_candidates,
            clips_created,
            clips_failed,
            average_score,
            top_grade,
            grade_distribution,
            success_rate,
        }
    }
}
