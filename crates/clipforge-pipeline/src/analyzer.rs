//! AI moment analysis.
//!
//! Sends the timestamped transcript to a chat-completion endpoint and turns
//! the response into validated moment candidates. The transport is called
//! exactly once per invocation; resilience lives in the tiered parser and
//! the fallback synthesis, not in a retry loop.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use clipforge_models::{MomentCandidate, VideoTranscript};

use crate::config::LlmConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::parse::parse_moments;
use crate::validate::{fallback_moments, rank_and_cap, validate_moments};

const SYSTEM_PROMPT: &str = "You are an expert social media analyst who identifies viral video moments. You understand what makes content shareable and engaging across platforms like TikTok, Instagram Reels, and YouTube Shorts.";

/// Extracts ranked viral-moment candidates from a transcript.
#[async_trait]
pub trait MomentAnalyzer: Send + Sync {
    /// Analyze a transcript, requesting candidates sized near
    /// `target_clip_seconds`.
    ///
    /// Precondition: the transcript must be non-empty; an empty one is an
    /// `InvalidArgument` violation by the caller.
    async fn extract_moments(
        &self,
        transcript: &VideoTranscript,
        target_clip_seconds: u32,
    ) -> PipelineResult<Vec<MomentCandidate>>;
}

/// Chat-completion request payload.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completion response payload.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Moment analyzer backed by a chat-completion language model.
#[derive(Debug)]
pub struct LlmMomentAnalyzer {
    client: reqwest::Client,
    config: LlmConfig,
    max_moments: usize,
}

impl LlmMomentAnalyzer {
    /// Create a new analyzer.
    pub fn new(config: LlmConfig, max_moments: usize) -> PipelineResult<Self> {
        if config.api_key.is_empty() {
            return Err(PipelineError::invalid_argument("LLM API key not configured"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::analysis_failed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            max_moments,
        })
    }

    /// Format transcript segments as "[12.3s] text" lines for the prompt.
    fn format_transcript(transcript: &VideoTranscript) -> String {
        transcript
            .segments
            .iter()
            .filter(|s| !s.text.is_empty())
            .map(|s| format!("[{:.1}s] {}", s.offset_seconds, s.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the analysis prompt with the fixed instruction set.
    fn build_prompt(transcript: &VideoTranscript, target_clip_seconds: u32) -> String {
        let transcript_text = Self::format_transcript(transcript);

        format!(
            r#"Analyze this video transcript and identify the TOP 5 most viral moments that would make great short clips.

VIDEO TRANSCRIPT WITH TIMESTAMPS:
{transcript_text}

CLIP REQUIREMENTS:
- Each clip should be exactly {target_clip_seconds} seconds long
- Focus on moments with high engagement potential (humor, shock, emotion, valuable insights)
- Consider viral elements: hooks, punchlines, dramatic reveals, strong emotions, quotable moments

For each viral moment, provide:
1. START_TIME and END_TIME (in seconds) for a {target_clip_seconds}-second clip
2. VIRALITY_SCORE (0.0 to 1.0 scale where 1.0 = extremely viral)
3. GRADE (A+, A, A-, B+, B, B-, C+, C, C-, D+, D, F)
4. JUSTIFICATION (why this moment is viral - specific reasons)
5. EMOTIONAL_KEYWORDS (3-5 words describing the emotion/hook)
6. URGENCY_INDICATORS (what makes people want to share immediately)

Respond ONLY in valid JSON format:
{{
  "viral_moments": [
    {{
      "start_timestamp": 45.2,
      "end_timestamp": 75.2,
      "virality_score": 0.92,
      "grade": "A",
      "justification": "Unexpected plot twist with strong emotional reaction that creates shareable moment",
      "emotional_keywords": ["shocking", "unexpected", "emotional", "relatable"],
      "urgency_indicators": ["plot twist", "strong reaction", "quotable line"]
    }}
  ]
}}
"#
        )
    }

    /// Run one chat completion and return the raw response text.
    async fn complete(&self, prompt: String) -> PipelineResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::analysis_failed(format!("model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::analysis_failed(format!(
                "model endpoint returned {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            PipelineError::analysis_failed(format!("failed to decode model response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::analysis_failed("no choices in model response"))
    }
}

#[async_trait]
impl MomentAnalyzer for LlmMomentAnalyzer {
    async fn extract_moments(
        &self,
        transcript: &VideoTranscript,
        target_clip_seconds: u32,
    ) -> PipelineResult<Vec<MomentCandidate>> {
        if transcript.is_empty() {
            return Err(PipelineError::invalid_argument(
                "transcript has no segments",
            ));
        }

        info!(
            segments = transcript.segments.len(),
            target = target_clip_seconds,
            "Analyzing transcript for viral moments"
        );

        let prompt = Self::build_prompt(transcript, target_clip_seconds);
        let response_text = self.complete(prompt).await?;

        let mut raw = parse_moments(&response_text);
        if raw.is_empty() {
            warn!("No candidates parsed from model output, synthesizing fallback moments");
            raw = fallback_moments(transcript.duration_seconds, target_clip_seconds);
        }

        let validated = validate_moments(raw, transcript.duration_seconds);
        let moments = rank_and_cap(validated, self.max_moments);

        info!(count = moments.len(), "Validated viral moments");
        Ok(moments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_models::{Grade, TranscriptSegment};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcript() -> VideoTranscript {
        VideoTranscript {
            video_id: Some("abc".into()),
            title: "Test".into(),
            duration_seconds: 120.0,
            segments: (0..5)
                .map(|i| TranscriptSegment {
                    offset_seconds: i as f64 * 24.0,
                    text: format!("segment {}", i),
                })
                .collect(),
        }
    }

    async fn analyzer_against(server: &MockServer) -> LlmMomentAnalyzer {
        LlmMomentAnalyzer::new(
            LlmConfig {
                api_url: server.uri(),
                api_key: "test-key".into(),
                timeout_secs: 5,
                ..LlmConfig::default()
            },
            5,
        )
        .unwrap()
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[test]
    fn test_new_requires_api_key() {
        let err = LlmMomentAnalyzer::new(LlmConfig::default(), 5).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn test_prompt_embeds_timestamped_lines() {
        let prompt = LlmMomentAnalyzer::build_prompt(&transcript(), 30);
        assert!(prompt.contains("[0.0s] segment 0"));
        assert!(prompt.contains("[96.0s] segment 4"));
        assert!(prompt.contains("exactly 30 seconds"));
        assert!(prompt.contains("viral_moments"));
    }

    #[tokio::test]
    async fn test_empty_transcript_is_a_precondition_violation() {
        let server = MockServer::start().await;
        let analyzer = analyzer_against(&server).await;

        let empty = VideoTranscript {
            video_id: None,
            title: "Empty".into(),
            duration_seconds: 0.0,
            segments: vec![],
        };

        let err = analyzer.extract_moments(&empty, 30).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_valid_model_output_is_ranked() {
        let server = MockServer::start().await;
        let content = r#"{"viral_moments": [
            {"start_timestamp": 50.0, "end_timestamp": 80.0, "virality_score": 0.82, "grade": "B", "justification": "solid", "emotional_keywords": ["fun"], "urgency_indicators": []},
            {"start_timestamp": 10.0, "end_timestamp": 40.0, "virality_score": 0.95, "grade": "A", "justification": "hook", "emotional_keywords": ["wow"], "urgency_indicators": ["share"]}
        ]}"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&server)
            .await;

        let analyzer = analyzer_against(&server).await;
        let moments = analyzer.extract_moments(&transcript(), 30).await.unwrap();

        assert_eq!(moments.len(), 2);
        assert_eq!(moments[0].score, 0.95);
        assert_eq!(moments[0].grade, Grade::A);
        assert_eq!(moments[1].grade, Grade::B);
    }

    #[tokio::test]
    async fn test_unparseable_output_yields_exactly_three_fallbacks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "Sorry, I cannot produce JSON for this transcript.",
            )))
            .mount(&server)
            .await;

        let analyzer = analyzer_against(&server).await;
        let moments = analyzer.extract_moments(&transcript(), 30).await.unwrap();

        // 120s video, 30s target: ~10s, ~45s, ~80s
        assert_eq!(moments.len(), 3);
        let mut starts: Vec<f64> = moments.iter().map(|m| m.start_seconds).collect();
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(starts, vec![10.0, 45.0, 80.0]);
        for m in &moments {
            assert_eq!(m.grade, Grade::B);
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_analysis_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let analyzer = analyzer_against(&server).await;
        let err = analyzer.extract_moments(&transcript(), 30).await.unwrap_err();
        assert!(matches!(err, PipelineError::AnalysisFailed(_)));
    }
}
