//! Request handlers.

pub mod clips;
pub mod health;
pub mod jobs;

use serde::Serialize;

use clipforge_models::{ProcessingStats, ViralClip};

/// Clip representation at the API boundary.
///
/// Scores leave the canonical 0.0-1.0 scale only here, as 0-100 integers.
#[derive(Debug, Serialize)]
pub struct ClipView {
    pub id: String,
    pub start: f64,
    pub end: f64,
    pub duration: f64,
    pub score: u8,
    pub grade: String,
    pub justification: String,
    pub emotional_keywords: Vec<String>,
    pub urgency_indicators: Vec<String>,
    pub media_url: Option<String>,
    pub file_size: u64,
    pub resolution: Option<String>,
}

impl ClipView {
    pub fn from_clip(clip: &ViralClip) -> Self {
        Self {
            id: clip.id.to_string(),
            start: clip.start_seconds,
            end: clip.end_seconds,
            duration: clip.duration(),
            score: clip.display_score(),
            grade: clip.grade.to_string(),
            justification: clip.justification.clone(),
            emotional_keywords: clip.emotional_keywords.clone(),
            urgency_indicators: clip.urgency_indicators.clone(),
            media_url: clip.media_url.clone(),
            file_size: clip.file_size_bytes,
            resolution: clip.resolution.clone(),
        }
    }
}

/// Aggregate statistics at the API boundary (display scale).
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub total_candidates: u32,
    pub clips_created: u32,
    pub clips_failed: u32,
    /// Mean score on the 0-100 display scale, one decimal
    pub average_score: f64,
    pub top_grade: Option<String>,
    pub grade_distribution: std::collections::BTreeMap<String, u32>,
    /// Percentage of clips at or above the A-grade-equivalent score
    pub success_rate: f64,
}

impl StatsView {
    pub fn from_stats(stats: &ProcessingStats) -> Self {
        Self {
            total_candidates: stats.total_candidates,
            clips_created: stats.clips_created,
            clips_failed: stats.clips_failed,
            average_score: (stats.average_score * 1000.0).round() / 10.0,
            top_grade: stats.top_grade.map(|g| g.to_string()),
            grade_distribution: stats.grade_distribution.clone(),
            success_rate: (stats.success_rate * 1000.0).round() / 10.0,
        }
    }
}
