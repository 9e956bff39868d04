//! Axum HTTP API for the clip processing service.
//!
//! Submit a job, poll its status, fetch the ranked results, download clips.
//! Submission returns immediately; the pipeline runs on a background task
//! whose handle lives in the shared job-task table.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
