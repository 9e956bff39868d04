//! Candidate validation and fallback synthesis.
//!
//! Every candidate, model-produced or fallback, passes through the same
//! validation before the orchestrator sees it. Validation repairs what it
//! can (clamping, defaults) and discards only candidates whose numeric
//! fields could not be coerced at all.

use clipforge_models::{Grade, MomentCandidate};

use crate::parse::RawMoment;

/// Smallest clip the validator will leave room for when clamping starts.
pub const MIN_CLIP_FLOOR_SECS: f64 = 1.0;

/// Distance from either edge of the source used by fallback synthesis.
pub const FALLBACK_EDGE_OFFSET_SECS: f64 = 10.0;

/// Placeholder justification for candidates the model left unexplained.
const DEFAULT_JUSTIFICATION: &str = "Viral potential detected";

/// Validate raw candidates against the source duration.
pub fn validate_moments(raw: Vec<RawMoment>, total_duration: f64) -> Vec<MomentCandidate> {
    raw.into_iter()
        .filter_map(|m| validate_moment(m, total_duration))
        .collect()
}

fn validate_moment(moment: RawMoment, total_duration: f64) -> Option<MomentCandidate> {
    // Numeric fields that cannot be coerced at all discard the candidate
    let start = moment.start.filter(|v| v.is_finite())?;
    let end = moment.end.filter(|v| v.is_finite())?;
    let score = moment.score.filter(|v| v.is_finite())?;

    if total_duration <= 0.0 {
        return None;
    }

    let start = start.clamp(0.0, (total_duration - MIN_CLIP_FLOOR_SECS).max(0.0));
    let mut end = end.clamp(start, total_duration);
    if end <= start {
        // Repair an empty range left over from clamping
        end = (start + MIN_CLIP_FLOOR_SECS).min(total_duration);
    }
    if end <= start {
        return None;
    }

    let score = score.clamp(0.0, 1.0);
    let grade = moment
        .grade
        .as_deref()
        .and_then(Grade::parse)
        .unwrap_or_else(|| Grade::from_score(score));

    Some(MomentCandidate {
        start_seconds: start,
        end_seconds: end,
        score,
        grade,
        justification: moment
            .justification
            .unwrap_or_else(|| DEFAULT_JUSTIFICATION.to_string()),
        emotional_keywords: moment.emotional_keywords,
        urgency_indicators: moment.urgency_indicators,
    })
}

/// Synthesize exactly three fallback candidates at fixed structural
/// positions: near the start, the midpoint, and near the end.
///
/// This guarantees the pipeline never produces zero candidates purely
/// because the model was unavailable or returned garbage.
pub fn fallback_moments(total_duration: f64, target_clip_seconds: u32) -> Vec<RawMoment> {
    let clip = target_clip_seconds as f64;
    let positions = [
        ("beginning", FALLBACK_EDGE_OFFSET_SECS),
        ("middle", (total_duration / 2.0 - clip / 2.0).max(0.0)),
        (
            "end",
            (total_duration - clip - FALLBACK_EDGE_OFFSET_SECS).max(0.0),
        ),
    ];

    positions
        .iter()
        .enumerate()
        .filter_map(|(i, (position, start))| {
            let end = (start + clip).min(total_duration);
            if end <= *start {
                return None;
            }

            Some(RawMoment {
                start: Some(*start),
                end: Some(end),
                score: Some(0.7 - i as f64 * 0.1),
                grade: Some("B".to_string()),
                justification: Some(format!("Fallback clip from {} of video", position)),
                emotional_keywords: vec!["engaging".to_string(), "content".to_string()],
                urgency_indicators: vec!["interesting".to_string(), "moment".to_string()],
            })
        })
        .collect()
}

/// Sort candidates by score descending and cap the result size.
pub fn rank_and_cap(mut moments: Vec<MomentCandidate>, cap: usize) -> Vec<MomentCandidate> {
    moments.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    moments.truncate(cap);
    moments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: f64, end: f64, score: f64) -> RawMoment {
        RawMoment {
            start: Some(start),
            end: Some(end),
            score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_bounds_hold_after_validation_even_for_hostile_input() {
        let hostile = vec![
            raw(-50.0, 20.0, 0.5),
            raw(10.0, 500.0, 1.7),
            raw(115.0, 300.0, -0.3),
            raw(200.0, 400.0, 0.4),
        ];

        for candidate in validate_moments(hostile, 120.0) {
            assert!(candidate.start_seconds >= 0.0);
            assert!(candidate.start_seconds < candidate.end_seconds);
            assert!(candidate.end_seconds <= 120.0);
            assert!((0.0..=1.0).contains(&candidate.score));
        }
    }

    #[test]
    fn test_uncoercible_numeric_fields_discard_the_candidate() {
        let missing_end = RawMoment {
            start: Some(5.0),
            score: Some(0.8),
            ..Default::default()
        };
        let missing_score = RawMoment {
            start: Some(5.0),
            end: Some(20.0),
            ..Default::default()
        };

        assert!(validate_moments(vec![missing_end, missing_score], 120.0).is_empty());
    }

    #[test]
    fn test_missing_optional_fields_get_placeholders() {
        let candidates = validate_moments(vec![raw(5.0, 35.0, 0.85)], 120.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].justification, "Viral potential detected");
        assert!(candidates[0].emotional_keywords.is_empty());
        // Grade derived from score when missing
        assert_eq!(candidates[0].grade, Grade::B);
    }

    #[test]
    fn test_provided_grade_is_kept() {
        let mut m = raw(5.0, 35.0, 0.7);
        m.grade = Some("B".to_string());
        let candidates = validate_moments(vec![m], 120.0);
        assert_eq!(candidates[0].grade, Grade::B);
    }

    #[test]
    fn test_unparseable_grade_falls_back_to_derivation() {
        let mut m = raw(5.0, 35.0, 0.95);
        m.grade = Some("excellent".to_string());
        let candidates = validate_moments(vec![m], 120.0);
        assert_eq!(candidates[0].grade, Grade::A);
    }

    #[test]
    fn test_fallback_synthesizes_three_positions() {
        // 120s video, 30s target: start ~10s, middle ~45s, end ~80s
        let moments = fallback_moments(120.0, 30);
        assert_eq!(moments.len(), 3);

        assert_eq!(moments[0].start, Some(10.0));
        assert_eq!(moments[1].start, Some(45.0));
        assert_eq!(moments[2].start, Some(80.0));

        assert_eq!(moments[0].score, Some(0.7));
        assert_eq!(moments[1].score, Some(0.6));
        assert_eq!(moments[2].score, Some(0.5));

        for m in &moments {
            assert_eq!(m.grade.as_deref(), Some("B"));
            assert!(m.end.unwrap() <= 120.0);
            assert!(m.end.unwrap() > m.start.unwrap());
        }
    }

    #[test]
    fn test_fallback_survives_validation() {
        let validated = validate_moments(fallback_moments(120.0, 30), 120.0);
        assert_eq!(validated.len(), 3);
        for candidate in &validated {
            assert_eq!(candidate.grade, Grade::B);
        }
    }

    #[test]
    fn test_fallback_on_short_video_still_in_bounds() {
        let validated = validate_moments(fallback_moments(20.0, 30), 20.0);
        assert!(!validated.is_empty());
        for candidate in &validated {
            assert!(candidate.end_seconds <= 20.0);
            assert!(candidate.start_seconds < candidate.end_seconds);
        }
    }

    #[test]
    fn test_rank_and_cap() {
        let moments = validate_moments(
            vec![
                raw(0.0, 10.0, 0.4),
                raw(10.0, 20.0, 0.9),
                raw(20.0, 30.0, 0.6),
                raw(30.0, 40.0, 0.8),
            ],
            120.0,
        );

        let ranked = rank_and_cap(moments, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].score, 0.9);
        assert_eq!(ranked[1].score, 0.8);
    }
}
