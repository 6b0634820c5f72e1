//! The owning view: one store, one submitter and one poller, mounted and
//! unmounted together.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::api::{HttpJobApi, JobApi};
use crate::config::ClientConfig;
use crate::error::{Result, SubmitError};
use crate::job::{JobSnapshot, JobStore};
use crate::poller::{PollerHandle, StatusPoller};
use crate::sanitize::{redact_path, redact_url};
use crate::upload::{SubmitOutcome, UploadFile, UploadSubmitter};
use crate::view::NoticeBoard;

/// Tracks uploads from submission until the server reports them finished.
///
/// Must be created inside a Tokio runtime; the status poller runs as a task
/// on it until [`UploadTracker::unmount`] or drop.
pub struct UploadTracker {
    config: ClientConfig,
    store: Arc<JobStore>,
    notice: Arc<NoticeBoard>,
    submitter: UploadSubmitter,
    poller: PollerHandle,
}

impl UploadTracker {
    /// Mounts a tracker talking to the configured HTTP API.
    pub fn mount(config: &ClientConfig) -> Result<Self> {
        let api = HttpJobApi::new(config)?;
        info!(
            "Upload tracker mounted against {}",
            redact_url(&config.api_base_url)
        );
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Mounts a tracker on any [`JobApi`] implementation.
    pub fn with_api(config: &ClientConfig, api: Arc<dyn JobApi>) -> Self {
        let store = Arc::new(JobStore::new());
        let notice = Arc::new(NoticeBoard::new());
        let submitter = UploadSubmitter::new(
            Arc::clone(&store),
            Arc::clone(&api),
            Arc::clone(&notice),
            config,
        );
        let poller =
            StatusPoller::new(Arc::clone(&store), api, config.poll_interval()).start();

        Self {
            config: config.clone(),
            store,
            notice,
            submitter,
            poller,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Current jobs, newest first.
    pub fn jobs(&self) -> JobSnapshot {
        self.store.snapshot()
    }

    pub fn notice(&self) -> &NoticeBoard {
        &self.notice
    }

    pub async fn submit(
        &self,
        file: Option<UploadFile>,
    ) -> std::result::Result<SubmitOutcome, SubmitError> {
        self.submitter.submit(file).await
    }

    /// Reads `path` from disk and submits it under its file name.
    pub async fn submit_path(&self, path: &Path) -> Result<SubmitOutcome> {
        let file = UploadFile::from_path(path).await?;
        info!("Submitting {}", redact_path(path));
        Ok(self.submitter.submit(Some(file)).await?)
    }

    pub async fn submit_all(
        &self,
        files: Vec<UploadFile>,
    ) -> Vec<std::result::Result<SubmitOutcome, SubmitError>> {
        self.submitter.submit_all(files).await
    }

    /// Asks the poller for an immediate status check.
    pub fn refresh(&self) {
        self.poller.trigger();
    }

    /// Stops polling. In-flight status checks are abandoned and their
    /// results never reach the store.
    pub async fn unmount(self) {
        self.poller.stop().await;
        info!("Upload tracker unmounted with {} job(s)", self.store.len());
    }
}
