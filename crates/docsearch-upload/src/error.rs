use std::path::PathBuf;
use thiserror::Error;

pub use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Failed to read upload file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid value '{value}' in environment variable '{name}': {reason}")]
    InvalidEnv {
        name: String,
        value: String,
        reason: String,
    },
}

/// Errors surfaced synchronously by the upload submitter.
///
/// Network and server failures are not errors here: they become a failed
/// job in the store plus a page notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// No file was chosen, or its extension is not in the allow-list.
    #[error("{message}")]
    Validation {
        filename: Option<String>,
        message: String,
    },

    /// The store already holds a job under the id picked for this upload.
    /// Nothing was uploaded.
    #[error("Job id '{id}' for '{filename}' is already in use")]
    DuplicateJob {
        filename: String,
        id: String,
        message: String,
    },
}

impl SubmitError {
    /// Message to show the user.
    pub fn message(&self) -> &str {
        match self {
            SubmitError::Validation { message, .. } => message,
            SubmitError::DuplicateJob { message, .. } => message,
        }
    }

    /// Name of the rejected file, if one was chosen.
    pub fn filename(&self) -> Option<&str> {
        match self {
            SubmitError::Validation { filename, .. } => filename.as_deref(),
            SubmitError::DuplicateJob { filename, .. } => Some(filename),
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
