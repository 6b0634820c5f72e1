//! Client side of the remote document API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpJobApi, JobApi};
pub use error::{extract_detail, ApiError};
pub use types::{CreateJobResponse, JobStatusResponse};
