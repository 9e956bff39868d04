//! Clip detail and download.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use clipforge_models::{ClipId, ViralClip};

use crate::error::{ApiError, ApiResult};
use crate::handlers::ClipView;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClipDetailResponse {
    pub success: bool,
    pub processing_id: String,
    pub clip: ClipView,
}

/// GET /api/clips/:id
pub async fn clip_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClipDetailResponse>> {
    let clip = state
        .store
        .get_clip(&ClipId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Clip not found"))?;

    Ok(Json(ClipDetailResponse {
        success: true,
        processing_id: clip.job_id.to_string(),
        clip: ClipView::from_clip(&clip),
    }))
}

/// GET /api/clips/:id/download
///
/// Streams the rendered artifact with an attachment disposition, from local
/// disk or the blob store depending on where the pipeline put it.
pub async fn download_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let clip = state
        .store
        .get_clip(&ClipId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Clip not found"))?;

    let bytes = load_artifact(&state, &clip).await?;

    let filename = format!("viral_clip_{}_{}.mp4", clip.display_score(), clip.id);
    let headers = [
        (header::CONTENT_TYPE, "video/mp4".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes).into_response())
}

/// Resolve a clip's media bytes from wherever the pipeline stored them.
async fn load_artifact(state: &AppState, clip: &ViralClip) -> ApiResult<Vec<u8>> {
    let media_url = clip
        .media_url
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Clip file not found"))?;

    let local = std::path::Path::new(media_url);
    if local.is_file() {
        return tokio::fs::read(local)
            .await
            .map_err(|e| ApiError::internal(format!("failed to read clip file: {}", e)));
    }

    if let Some(blob) = &state.blob {
        if let Some(key) = blob.key_for_url(media_url) {
            return blob
                .get(&key)
                .await
                .map_err(|_| ApiError::not_found("Clip file not found"));
        }
    }

    Err(ApiError::not_found("Clip file not found"))
}
