//! API integration tests against an in-memory state with fake pipeline
//! capabilities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use clipforge_api::{create_router, ApiConfig, AppState};
use clipforge_media::ClipArtifact;
use clipforge_models::{Grade, MomentCandidate, TranscriptSegment, VideoTranscript};
use clipforge_pipeline::{
    ClipExtractor, MediaFetcher, MomentAnalyzer, PipelineConfig, PipelineResult, PipelineRunner,
    TranscriptSource,
};
use clipforge_store::{InMemoryJobStore, JobStore};

// ---------------------------------------------------------------------------
// Fake capabilities: a pipeline that always succeeds with two clips
// ---------------------------------------------------------------------------

struct FixtureTranscripts;

#[async_trait]
impl TranscriptSource for FixtureTranscripts {
    async fn fetch_transcript(&self, _url: &str) -> PipelineResult<VideoTranscript> {
        Ok(VideoTranscript {
            video_id: Some("abc123def45".to_string()),
            title: "Fixture Video".to_string(),
            duration_seconds: 120.0,
            segments: vec![
                TranscriptSegment {
                    offset_seconds: 0.0,
                    text: "first".to_string(),
                },
                TranscriptSegment {
                    offset_seconds: 60.0,
                    text: "second".to_string(),
                },
            ],
        })
    }
}

struct FixtureAnalyzer;

#[async_trait]
impl MomentAnalyzer for FixtureAnalyzer {
    async fn extract_moments(
        &self,
        _transcript: &VideoTranscript,
        _target_clip_seconds: u32,
    ) -> PipelineResult<Vec<MomentCandidate>> {
        Ok(vec![
            MomentCandidate {
                start_seconds: 10.0,
                end_seconds: 40.0,
                score: 0.95,
                grade: Grade::A,
                justification: "strong hook".to_string(),
                emotional_keywords: vec!["shocking".to_string()],
                urgency_indicators: vec!["quotable".to_string()],
            },
            MomentCandidate {
                start_seconds: 60.0,
                end_seconds: 90.0,
                score: 0.82,
                grade: Grade::B,
                justification: "solid payoff".to_string(),
                emotional_keywords: vec![],
                urgency_indicators: vec![],
            },
        ])
    }
}

struct FixtureFetcher;

#[async_trait]
impl MediaFetcher for FixtureFetcher {
    async fn fetch_media(&self, _url: &str, work_dir: &Path) -> PipelineResult<PathBuf> {
        Ok(work_dir.join("source.mp4"))
    }

    async fn release(&self, _path: &Path) {}
}

struct FixtureExtractor;

#[async_trait]
impl ClipExtractor for FixtureExtractor {
    async fn is_available(&self) -> bool {
        true
    }

    async fn create_clip(
        &self,
        _source: &Path,
        start_secs: f64,
        end_secs: f64,
        output: &Path,
    ) -> PipelineResult<ClipArtifact> {
        Ok(ClipArtifact {
            path: output.to_path_buf(),
            file_size_bytes: 2048,
            duration_seconds: end_secs - start_secs,
            resolution: Some("1280x720".to_string()),
        })
    }
}

fn test_state(work_dir: &Path) -> AppState {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

    let config = PipelineConfig {
        work_dir: work_dir.to_path_buf(),
        ..PipelineConfig::default()
    };

    let runner = Arc::new(PipelineRunner::new(
        config,
        Arc::new(FixtureTranscripts),
        Arc::new(FixtureAnalyzer),
        Arc::new(FixtureFetcher),
        Arc::new(FixtureExtractor),
        Arc::clone(&store),
        None,
    ));

    AppState {
        config: ApiConfig::default(),
        store,
        runner,
        blob: None,
        tasks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Poll the status endpoint until the job reaches a terminal state.
async fn wait_for_terminal(app: &axum::Router, id: &str) -> Value {
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get(&format!("/api/status/{}", id)))
            .await
            .unwrap();
        let body = body_json(response).await;

        let status = body["status"].as_str().unwrap_or_default().to_string();
        if status == "completed" || status == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never reached a terminal state", id);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn submit_rejects_missing_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    let response = app
        .oneshot(post_json("/api/process", json!({ "clip_duration": 30 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "YouTube URL is required");
}

#[tokio::test]
async fn submit_rejects_out_of_range_duration() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    for duration in [4, 61, 300] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/process",
                json!({
                    "youtube_url": "https://youtube.com/watch?v=abc123def45",
                    "clip_duration": duration
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("between 5 and 60"));
    }
}

#[tokio::test]
async fn submit_rejects_unparseable_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    let response = app
        .oneshot(post_json(
            "/api/process",
            json!({ "youtube_url": "not a url", "clip_duration": 30 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ids_return_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    for uri in [
        "/api/status/nope",
        "/api/results/nope",
        "/api/clips/nope",
        "/api/clips/nope/download",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    }
}

#[tokio::test]
async fn submit_poll_results_flow() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(dir.path()));

    // Submit
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/process",
            json!({
                "youtube_url": "https://youtube.com/watch?v=abc123def45",
                "clip_duration": 30
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["processing_id"].as_str().unwrap().to_string();

    // Poll until terminal
    let status = wait_for_terminal(&app, &id).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["total_clips"], 2);
    assert!(status["error_message"].is_null());
    assert_eq!(status["video_info"]["title"], "Fixture Video");
    assert_eq!(status["processing_stats"]["clips_created"], 2);

    // Results: descending display scores, aggregates present
    let response = app
        .clone()
        .oneshot(get(&format!("/api/results/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let results = body_json(response).await;
    let clips = results["clips"].as_array().unwrap();
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0]["score"], 95);
    assert_eq!(clips[0]["grade"], "A");
    assert_eq!(clips[1]["score"], 82);
    assert_eq!(clips[1]["grade"], "B");
    assert_eq!(results["pagination"]["total_clips"], 2);
    assert_eq!(results["analytics"]["top_grade"], "A");

    // Clip detail round-trips
    let clip_id = clips[0]["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/api/clips/{}", clip_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The fake extractor never wrote the file, so download is a 404
    let response = app
        .clone()
        .oneshot(get(&format!("/api/clips/{}/download", clip_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // History includes the job
    let response = app.clone().oneshot(get("/api/history")).await.unwrap();
    let history = body_json(response).await;
    assert_eq!(history["stats"]["total_processed"], 1);
    assert_eq!(history["stats"]["successful_processings"], 1);
    assert_eq!(history["jobs"][0]["best_score"], 95);
}

#[tokio::test]
async fn download_streams_existing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let app = create_router(state.clone());

    // Persist a clip whose media_url points at a real file
    let media_path = dir.path().join("clip_1.mp4");
    tokio::fs::write(&media_path, b"fake mp4 bytes").await.unwrap();

    let job = clipforge_models::ProcessingJob::new("https://youtube.com/watch?v=abc123def45", 30);
    let job_id = job.id.clone();
    state.store.create_job(job).await.unwrap();

    let candidate = MomentCandidate {
        start_seconds: 0.0,
        end_seconds: 30.0,
        score: 0.9,
        grade: Grade::AMinus,
        justification: "test".to_string(),
        emotional_keywords: vec![],
        urgency_indicators: vec![],
    };
    let mut clip = clipforge_models::ViralClip::from_candidate(job_id, &candidate);
    clip.media_url = Some(media_path.to_string_lossy().to_string());
    let clip_id = clip.id.to_string();
    state.store.insert_clips(vec![clip]).await.unwrap();

    let response = app
        .oneshot(get(&format!("/api/clips/{}/download", clip_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "video/mp4"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"fake mp4 bytes");
}
