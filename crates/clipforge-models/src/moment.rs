//! Validated analyzer output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// A candidate viral moment after the validation pass.
///
/// Invariants (enforced by the analyzer's validation, not re-checked here):
/// `0 <= start_seconds < end_seconds <= source duration` and
/// `0.0 <= score <= 1.0`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MomentCandidate {
    /// Offset into the source media, seconds
    pub start_seconds: f64,

    /// End offset, seconds
    pub end_seconds: f64,

    /// Virality score on the canonical 0.0-1.0 scale
    pub score: f64,

    /// Letter grade, always consistent with `score`
    pub grade: Grade,

    /// Why the model judged this moment notable
    pub justification: String,

    /// Short emotion/hook descriptors
    pub emotional_keywords: Vec<String>,

    /// What makes people want to share immediately
    pub urgency_indicators: Vec<String>,
}

impl MomentCandidate {
    /// Clip length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}
