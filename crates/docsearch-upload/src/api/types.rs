//! Wire types of the document API.

use serde::{Deserialize, Serialize};

use crate::job::{JobPatch, JobStatus};

/// Response of `POST <upload endpoint>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateJobResponse {
    /// Initial status; `pending` when the server omits it.
    pub fn initial_status(&self) -> JobStatus {
        self.status
            .as_deref()
            .map(JobStatus::parse)
            .unwrap_or(JobStatus::Pending)
    }
}

/// Response of `GET <job endpoint>/{id}`. Absent fields mean "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<JobStatusResponse> for JobPatch {
    fn from(resp: JobStatusResponse) -> Self {
        JobPatch {
            status: resp.status.as_deref().map(JobStatus::parse),
            file_path: resp.file_path,
            created_at: resp.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_response_defaults_to_pending() {
        let resp: CreateJobResponse = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(resp.id, 42);
        assert_eq!(resp.initial_status(), JobStatus::Pending);

        let resp: CreateJobResponse =
            serde_json::from_str(r#"{"id": 7, "status": "processing"}"#).unwrap();
        assert_eq!(resp.initial_status(), JobStatus::Processing);
    }

    #[test]
    fn test_status_response_ignores_extra_fields() {
        let resp: JobStatusResponse = serde_json::from_str(
            r#"{"id": 42, "status": "completed", "file_path": "/store/42.pdf", "title": "x"}"#,
        )
        .unwrap();
        let patch = JobPatch::from(resp);
        assert_eq!(patch.status, Some(JobStatus::Completed));
        assert_eq!(patch.file_path.as_deref(), Some("/store/42.pdf"));
        assert_eq!(patch.created_at, None);
    }

    #[test]
    fn test_empty_status_response_is_empty_patch() {
        let resp: JobStatusResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(JobPatch::from(resp), JobPatch::default());
    }
}
