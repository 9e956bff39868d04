//! Tiered parsing of language-model output.
//!
//! Model output is free text that usually, but not always, contains the
//! requested JSON. Parsing is staged: strict JSON of the full body, then a
//! regex-extracted `{...}` block containing `viral_moments`, then
//! field-by-field salvage of individual candidate objects. Each tier
//! tolerates more damage than the last; validation downstream decides what
//! survives.

use regex::Regex;
use serde_json::Value;

/// A candidate moment as parsed, before validation.
///
/// Fields are optional because salvage parsing may recover only some of
/// them; candidates whose numeric fields cannot be coerced at all are
/// discarded by validation, everything else is repaired.
#[derive(Debug, Clone, Default)]
pub struct RawMoment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub score: Option<f64>,
    pub grade: Option<String>,
    pub justification: Option<String>,
    pub emotional_keywords: Vec<String>,
    pub urgency_indicators: Vec<String>,
}

/// Parse model output into raw candidates, trying each tier in order.
pub fn parse_moments(raw: &str) -> Vec<RawMoment> {
    let text = strip_code_fences(raw);

    if let Some(moments) = parse_strict(text) {
        return moments;
    }

    if let Some(moments) = parse_embedded(text) {
        return moments;
    }

    salvage(text)
}

/// Strip a markdown code fence wrapper, if present.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Tier (a): the whole body is the requested JSON object.
fn parse_strict(text: &str) -> Option<Vec<RawMoment>> {
    let value: Value = serde_json::from_str(text).ok()?;
    moments_from_value(&value)
}

/// Tier (b): the body contains prose around a `{...}` block with the
/// `viral_moments` key.
fn parse_embedded(text: &str) -> Option<Vec<RawMoment>> {
    let block_re = Regex::new(r"(?s)\{.*\}").expect("static regex");
    let block = block_re.find(text)?.as_str();

    if !block.contains("viral_moments") {
        return None;
    }

    let value: Value = serde_json::from_str(block).ok()?;
    moments_from_value(&value)
}

/// Tier (c): the JSON is truncated or malformed; salvage whatever complete
/// candidate objects remain, field by field.
fn salvage(text: &str) -> Vec<RawMoment> {
    let object_re = Regex::new(r"\{[^{}]*\}").expect("static regex");

    object_re
        .find_iter(text)
        .filter(|m| m.as_str().contains("start_timestamp"))
        .map(|m| salvage_object(m.as_str()))
        .filter(|m| m.start.is_some() || m.end.is_some() || m.score.is_some())
        .collect()
}

fn salvage_object(block: &str) -> RawMoment {
    RawMoment {
        start: salvage_number(block, "start_timestamp"),
        end: salvage_number(block, "end_timestamp"),
        score: salvage_number(block, "virality_score"),
        grade: salvage_string(block, "grade"),
        justification: salvage_string(block, "justification"),
        emotional_keywords: salvage_string_list(block, "emotional_keywords"),
        urgency_indicators: salvage_string_list(block, "urgency_indicators"),
    }
}

fn salvage_number(block: &str, key: &str) -> Option<f64> {
    let re = Regex::new(&format!(
        r#""{}"\s*:\s*"?(-?[0-9]+(?:\.[0-9]+)?)"#,
        regex::escape(key)
    ))
    .ok()?;
    re.captures(block)?.get(1)?.as_str().parse().ok()
}

fn salvage_string(block: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(r#""{}"\s*:\s*"([^"]*)""#, regex::escape(key))).ok()?;
    let value = re.captures(block)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn salvage_string_list(block: &str, key: &str) -> Vec<String> {
    let re = match Regex::new(&format!(r#""{}"\s*:\s*\[([^\]]*)\]"#, regex::escape(key))) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let Some(caps) = re.captures(block) else {
        return Vec::new();
    };

    let item_re = Regex::new(r#""([^"]*)""#).expect("static regex");
    item_re
        .captures_iter(&caps[1])
        .filter_map(|c| {
            let item = c[1].trim().to_string();
            if item.is_empty() {
                None
            } else {
                Some(item)
            }
        })
        .collect()
}

/// Extract candidates from a parsed JSON value.
///
/// Accepts the requested `{"viral_moments": [...]}` object or a bare array.
fn moments_from_value(value: &Value) -> Option<Vec<RawMoment>> {
    let array = match value {
        Value::Object(map) => map.get("viral_moments")?.as_array()?,
        Value::Array(items) => items,
        _ => return None,
    };

    Some(array.iter().filter_map(moment_from_object).collect())
}

fn moment_from_object(value: &Value) -> Option<RawMoment> {
    let obj = value.as_object()?;

    Some(RawMoment {
        start: obj.get("start_timestamp").and_then(coerce_f64),
        end: obj.get("end_timestamp").and_then(coerce_f64),
        score: obj.get("virality_score").and_then(coerce_f64),
        grade: obj
            .get("grade")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        justification: obj
            .get("justification")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        emotional_keywords: coerce_string_list(obj.get("emotional_keywords")),
        urgency_indicators: coerce_string_list(obj.get("urgency_indicators")),
    })
}

/// Coerce a JSON value to f64, tolerating string-typed numbers and a
/// trailing "s" unit suffix.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('s').trim().parse().ok(),
        _ => None,
    }
}

fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "viral_moments": [
            {
                "start_timestamp": 45.2,
                "end_timestamp": 75.2,
                "virality_score": 0.92,
                "grade": "A",
                "justification": "Unexpected plot twist",
                "emotional_keywords": ["shocking", "unexpected"],
                "urgency_indicators": ["plot twist"]
            },
            {
                "start_timestamp": 10.0,
                "end_timestamp": 40.0,
                "virality_score": 0.81,
                "grade": "B-",
                "justification": "Strong hook",
                "emotional_keywords": ["funny"],
                "urgency_indicators": ["quotable line"]
            }
        ]
    }"#;

    #[test]
    fn test_strict_parse() {
        let moments = parse_moments(WELL_FORMED);
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[0].start, Some(45.2));
        assert_eq!(moments[0].grade.as_deref(), Some("A"));
        assert_eq!(moments[1].emotional_keywords, vec!["funny"]);
    }

    #[test]
    fn test_strict_parse_inside_code_fence() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(parse_moments(&fenced).len(), 2);
    }

    #[test]
    fn test_embedded_parse_with_surrounding_prose() {
        let wrapped = format!(
            "Here are the viral moments you asked for:\n\n{}\n\nLet me know if you need more!",
            WELL_FORMED
        );
        let moments = parse_moments(&wrapped);
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[1].score, Some(0.81));
    }

    #[test]
    fn test_salvage_from_truncated_output() {
        // Second object is cut off mid-field; the first must still be
        // recovered even though the document as a whole never parses.
        let truncated = r#"{"viral_moments": [
            {"start_timestamp": 12.5, "end_timestamp": 42.5, "virality_score": 0.88, "grade": "B+", "justification": "Great hook", "emotional_keywords": ["bold"], "urgency_indicators": []},
            {"start_timestamp": 90.0, "end_timestamp": 1"#;

        let moments = parse_moments(truncated);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].start, Some(12.5));
        assert_eq!(moments[0].score, Some(0.88));
        assert_eq!(moments[0].emotional_keywords, vec!["bold"]);
    }

    #[test]
    fn test_salvage_tolerates_string_typed_numbers() {
        let noisy = r#"{
            "viral_moments": [
                {"start_timestamp": "45.2s", "end_timestamp": "75.2", "virality_score": "0.9"}
            ]
        }"#;

        let moments = parse_moments(noisy);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].start, Some(45.2));
        assert_eq!(moments[0].end, Some(75.2));
        assert_eq!(moments[0].score, Some(0.9));
        assert!(moments[0].grade.is_none());
    }

    #[test]
    fn test_no_candidates_in_garbage() {
        assert!(parse_moments("I could not analyze this transcript.").is_empty());
        assert!(parse_moments("").is_empty());
        assert!(parse_moments(r#"{"answer": 42}"#).is_empty());
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let bare = r#"[{"start_timestamp": 1.0, "end_timestamp": 31.0, "virality_score": 0.75}]"#;
        let moments = parse_moments(bare);
        assert_eq!(moments.len(), 1);
    }
}
