//! Small constructors for test inputs.

#![allow(dead_code)]

use docsearch_upload::api::{ApiError, CreateJobResponse, JobStatusResponse};
use docsearch_upload::{ClientConfig, UploadFile};

pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, b"%PDF-1.7\n".to_vec())
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
}

pub fn config_with_interval(ms: u64) -> ClientConfig {
    ClientConfig {
        poll_interval_ms: ms,
        ..ClientConfig::default()
    }
}

pub fn created(id: u64, status: Option<&str>) -> Result<CreateJobResponse, ApiError> {
    Ok(CreateJobResponse {
        id,
        status: status.map(str::to_string),
    })
}

pub fn status(s: &str) -> Result<JobStatusResponse, ApiError> {
    Ok(JobStatusResponse {
        status: Some(s.to_string()),
        ..Default::default()
    })
}

pub fn status_with_path(s: &str, path: &str) -> Result<JobStatusResponse, ApiError> {
    Ok(JobStatusResponse {
        status: Some(s.to_string()),
        file_path: Some(path.to_string()),
        ..Default::default()
    })
}

pub fn network_error() -> Result<JobStatusResponse, ApiError> {
    Err(ApiError::Network("connection reset".to_string()))
}
