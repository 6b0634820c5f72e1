//! HTTP client for the document API's upload and job-status endpoints.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::error::{extract_detail, truncate_body, ApiError};
use super::types::{CreateJobResponse, JobStatusResponse};
use crate::config::ClientConfig;
use crate::sanitize::redact_url;
use crate::upload::UploadFile;

/// The two calls the tracker makes against the server.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Uploads a file as multipart field `file`, creating a job.
    async fn create_job(&self, file: &UploadFile) -> Result<CreateJobResponse, ApiError>;

    /// Fetches the current server-side state of one job.
    async fn fetch_job(&self, id: u64) -> Result<JobStatusResponse, ApiError>;
}

/// `JobApi` over HTTP.
pub struct HttpJobApi {
    client: Client,
    config: ClientConfig,
}

/// Creates an HTTP client, applying only the timeouts the config sets.
fn create_http_client(config: &ClientConfig) -> Result<Client, ApiError> {
    let mut builder = Client::builder();
    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ApiError::Client(format!("Failed to create HTTP client: {}", e)))
}

impl HttpJobApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: create_http_client(config)?,
            config: config.clone(),
        })
    }

    /// Builds the API on an existing client, sharing its connection pool.
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }
}

/// Turns a response into `T`, or into `ApiError::Http` with the body's
/// `detail` for non-2xx statuses.
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(
            "Request failed with {}: {}",
            status,
            truncate_body(&body)
        );
        return Err(ApiError::Http {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn create_job(&self, file: &UploadFile) -> Result<CreateJobResponse, ApiError> {
        let url = self.config.upload_url();
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type())
            .map_err(|e| ApiError::Client(format!("Invalid MIME type: {}", e)))?;
        let form = Form::new().part("file", part);

        debug!("POST {} ({} bytes)", redact_url(&url), file.bytes.len());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                ApiError::Network(format!(
                    "Upload to {} failed: {}",
                    redact_url(&url),
                    e.without_url()
                ))
            })?;

        decode_response(response).await
    }

    async fn fetch_job(&self, id: u64) -> Result<JobStatusResponse, ApiError> {
        let url = self.config.job_url(id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                ApiError::Network(format!(
                    "Status check at {} failed: {}",
                    redact_url(&url),
                    e.without_url()
                ))
            })?;

        decode_response(response).await
    }
}
