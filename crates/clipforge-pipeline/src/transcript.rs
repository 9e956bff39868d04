//! Transcript retrieval.
//!
//! The scraping service returns heterogeneous item shapes depending on the
//! upstream actor version; everything is normalized into the fixed
//! `VideoTranscript` shape here, at the boundary, so nothing downstream has
//! to guess about field names.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use clipforge_models::{TranscriptSegment, VideoTranscript};

use crate::config::TranscriptConfig;
use crate::error::{PipelineError, PipelineResult};

/// Buffer added when the duration has to be synthesized from the last
/// segment offset.
const DURATION_BUFFER_SECS: f64 = 5.0;

/// Fetches a timestamped transcript for a video URL.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, url: &str) -> PipelineResult<VideoTranscript>;
}

/// Transcript source backed by an HTTP scraping service.
pub struct HttpTranscriptSource {
    client: reqwest::Client,
    config: TranscriptConfig,
}

impl HttpTranscriptSource {
    /// Create a new transcript source.
    pub fn new(config: TranscriptConfig) -> PipelineResult<Self> {
        if config.api_url.is_empty() {
            return Err(PipelineError::invalid_argument(
                "transcript service URL not configured",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::transcript_failed(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn fetch_transcript(&self, url: &str) -> PipelineResult<VideoTranscript> {
        info!("Fetching transcript for {}", url);

        let mut request = self
            .client
            .post(&self.config.api_url)
            .json(&serde_json::json!({ "videoUrl": url }));

        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::transcript_failed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::transcript_failed(format!(
                "transcript service returned {}: {}",
                status, body
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| PipelineError::transcript_failed(e.to_string()))?;

        let transcript = normalize_response(&payload)?;
        info!(
            segments = transcript.segments.len(),
            duration = transcript.duration_seconds,
            "Normalized transcript"
        );
        Ok(transcript)
    }
}

/// Normalize a scraping-service response into `VideoTranscript`.
///
/// Accepts a bare item, an array of items, or `{"items": [...]}`; the first
/// item wins. Segment offsets may appear as `start`/`offset`/`offsetSeconds`
/// (seconds) or `startMs`/`tStartMs` (milliseconds), as numbers or numeric
/// strings.
pub fn normalize_response(payload: &Value) -> PipelineResult<VideoTranscript> {
    let item = first_item(payload)
        .ok_or_else(|| PipelineError::transcript_failed("no transcript items returned"))?;

    let title = pick_str(item, &["title", "videoTitle", "video_title"])
        .unwrap_or_else(|| "Untitled".to_string());
    let video_id = pick_str(item, &["videoId", "video_id", "id"]);

    let raw_segments = pick_array(item, &["subtitles", "transcript", "segments", "captions"])
        .ok_or_else(|| PipelineError::transcript_failed("no transcript segments in response"))?;

    let mut segments: Vec<TranscriptSegment> = raw_segments
        .iter()
        .filter_map(normalize_segment)
        .collect();

    if segments.is_empty() {
        return Err(PipelineError::transcript_failed(
            "transcript segments were empty",
        ));
    }

    segments.sort_by(|a, b| {
        a.offset_seconds
            .partial_cmp(&b.offset_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let upstream_duration = item
        .get("duration")
        .or_else(|| item.get("durationSeconds"))
        .or_else(|| item.get("lengthSeconds"))
        .and_then(coerce_seconds);

    let duration_seconds = match upstream_duration {
        Some(d) if d > 0.0 => d,
        // Upstream omitted it; synthesize from the last segment
        _ => segments.last().map(|s| s.offset_seconds).unwrap_or(0.0) + DURATION_BUFFER_SECS,
    };

    Ok(VideoTranscript {
        video_id,
        title,
        duration_seconds,
        segments,
    })
}

fn first_item(payload: &Value) -> Option<&Value> {
    match payload {
        Value::Array(items) => items.first(),
        Value::Object(map) => match map.get("items").and_then(|v| v.as_array()) {
            Some(items) => items.first(),
            None => Some(payload),
        },
        _ => None,
    }
}

fn normalize_segment(value: &Value) -> Option<TranscriptSegment> {
    let obj = value.as_object()?;

    let offset_seconds = obj
        .get("start")
        .or_else(|| obj.get("offset"))
        .or_else(|| obj.get("offsetSeconds"))
        .and_then(coerce_seconds)
        .or_else(|| {
            obj.get("startMs")
                .or_else(|| obj.get("tStartMs"))
                .and_then(coerce_seconds)
                .map(|ms| ms / 1000.0)
        })?;

    let text = obj
        .get("text")
        .or_else(|| obj.get("content"))
        .or_else(|| obj.get("line"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    Some(TranscriptSegment {
        offset_seconds,
        text,
    })
}

fn coerce_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn pick_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn pick_array<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| item.get(*k)).and_then(|v| v.as_array())
}
