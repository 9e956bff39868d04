//! Application state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use clipforge_models::JobId;
use clipforge_pipeline::{PipelineConfig, PipelineRunner};
use clipforge_storage::{BlobStore, BlobStoreConfig};
use clipforge_store::{InMemoryJobStore, JobStore};

use crate::config::ApiConfig;

/// Handles of spawned pipeline tasks, keyed by job.
///
/// The status endpoint reads job state from the store, not from these
/// handles; they exist so a future cancel endpoint can abort a run.
pub type JobTaskTable = Arc<Mutex<HashMap<JobId, JoinHandle<()>>>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub runner: Arc<PipelineRunner>,
    pub blob: Option<Arc<BlobStore>>,
    pub tasks: JobTaskTable,
}

impl AppState {
    /// Create application state wired to the real capabilities.
    pub fn new(config: ApiConfig, pipeline_config: PipelineConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());

        // The blob store is optional: absent configuration means local-only
        // mode, decided here once rather than per call site.
        let blob = match BlobStoreConfig::from_env() {
            Ok(blob_config) => Some(Arc::new(BlobStore::new(blob_config))),
            Err(e) => {
                info!("Blob store not configured ({}), running local-only", e);
                None
            }
        };

        let runner = Arc::new(PipelineRunner::from_config(
            pipeline_config,
            Arc::clone(&store),
            blob.clone(),
        )?);

        Ok(Self {
            config,
            store,
            runner,
            blob,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        })
    }
}
