//! Upload submission: validate, show the job at once, create it server-side.

use std::sync::Arc;

use futures_util::future::join_all;
use log::{info, warn};
use tracing::Instrument;

use crate::api::JobApi;
use crate::config::ClientConfig;
use crate::error::SubmitError;
use crate::job::{Job, JobId, JobStatus, JobStore};
use crate::upload::temp_id::temporary_id;
use crate::upload::validation::has_allowed_extension;
use crate::upload::UploadFile;
use crate::view::NoticeBoard;

/// How an accepted submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server created the job; the store entry now carries `id`.
    Created { id: u64, status: JobStatus },
    /// The create call failed; the store entry is `failed` under `temp_id`.
    Failed { temp_id: String, message: String },
}

impl SubmitOutcome {
    /// Current store id of the job this submission produced.
    pub fn job_id(&self) -> JobId {
        match self {
            SubmitOutcome::Created { id, .. } => JobId::Assigned(*id),
            SubmitOutcome::Failed { temp_id, .. } => JobId::Temporary(temp_id.clone()),
        }
    }
}

/// Accepts files from the user and drives them through the create call.
pub struct UploadSubmitter {
    store: Arc<JobStore>,
    api: Arc<dyn JobApi>,
    notice: Arc<NoticeBoard>,
    allowed_extensions: Vec<String>,
    validation_message: String,
    fallback_error_message: String,
    temp_ids: fn() -> String,
}

impl UploadSubmitter {
    pub fn new(
        store: Arc<JobStore>,
        api: Arc<dyn JobApi>,
        notice: Arc<NoticeBoard>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            store,
            api,
            notice,
            allowed_extensions: config.allowed_extensions.clone(),
            validation_message: config.validation_message.clone(),
            fallback_error_message: config.fallback_error_message.clone(),
            temp_ids: temporary_id,
        }
    }

    /// Replaces the generator of temporary job ids.
    pub fn with_temp_id_source(mut self, source: fn() -> String) -> Self {
        self.temp_ids = source;
        self
    }

    /// Checks that a file was chosen and that its extension is allowed.
    pub fn validate(&self, filename: Option<&str>) -> Result<(), SubmitError> {
        match filename {
            Some(name) if has_allowed_extension(name, &self.allowed_extensions) => Ok(()),
            other => Err(SubmitError::Validation {
                filename: other.map(str::to_string),
                message: self.validation_message.clone(),
            }),
        }
    }

    fn accept(&self, file: Option<UploadFile>) -> Result<UploadFile, SubmitError> {
        self.validate(file.as_ref().map(|f| f.filename.as_str()))?;
        file.ok_or_else(|| SubmitError::Validation {
            filename: None,
            message: self.validation_message.clone(),
        })
    }

    /// Submits one file.
    ///
    /// A rejected file, or one whose temporary id is already taken, returns
    /// `Err` and leaves the store untouched. An
    /// accepted file is appended as `uploading` before the network call,
    /// then promoted or marked failed in place once the call resolves.
    pub async fn submit(
        &self,
        file: Option<UploadFile>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let file = match self.accept(file) {
            Ok(file) => file,
            Err(e) => {
                warn!("Rejected upload: {:?}", e);
                self.notice.raise(e.message());
                return Err(e);
            }
        };

        let temp_id = (self.temp_ids)();
        let temp_key = JobId::Temporary(temp_id.clone());
        if !self
            .store
            .append(Job::uploading(temp_id.clone(), file.filename.clone()))
        {
            let e = SubmitError::DuplicateJob {
                filename: file.filename,
                id: temp_id,
                message: self.fallback_error_message.clone(),
            };
            warn!("Not uploading: {}", e);
            self.notice.raise(e.message());
            return Err(e);
        }

        let span = tracing::info_span!("upload.submit", filename = %file.filename);
        let result = self.api.create_job(&file).instrument(span).await;

        let outcome = match result {
            Ok(created) => {
                let status = created.initial_status();
                self.store
                    .update_by_id(&temp_key, |job| job.promoted(created.id, status.clone()));
                info!(
                    "Upload of {} accepted as job {} ({})",
                    file.filename, created.id, status
                );
                SubmitOutcome::Created {
                    id: created.id,
                    status,
                }
            }
            Err(e) => {
                let message = e.user_message(&self.fallback_error_message).to_string();
                warn!("Upload of {} failed: {}", file.filename, e);
                self.store
                    .update_by_id(&temp_key, |job| job.failed(message.clone()));
                self.notice.raise(message.clone());
                SubmitOutcome::Failed { temp_id, message }
            }
        };

        Ok(outcome)
    }

    /// Submits several files at once, as for a multi-file drop.
    ///
    /// Each file is validated and uploaded independently; one outcome per
    /// input, in input order.
    pub async fn submit_all(
        &self,
        files: Vec<UploadFile>,
    ) -> Vec<Result<SubmitOutcome, SubmitError>> {
        join_all(files.into_iter().map(|file| self.submit(Some(file)))).await
    }
}
