use serde::{Deserialize, Serialize};

/// Settings for talking to the document API and tracking uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    #[serde(default = "default_job_path")]
    pub job_path: String,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_validation_message")]
    pub validation_message: String,
    #[serde(default = "default_fallback_error_message")]
    pub fallback_error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_upload_path() -> String {
    "documents/upload".to_string()
}

fn default_job_path() -> String {
    "documents".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".pdf".to_string()]
}

fn default_poll_interval_ms() -> u64 {
    2500
}

fn default_validation_message() -> String {
    "PDF 파일만 업로드할 수 있습니다.".to_string()
}

fn default_fallback_error_message() -> String {
    "업로드 중 오류가 발생했습니다.".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            api_base_url: default_api_base_url(),
            upload_path: default_upload_path(),
            job_path: default_job_path(),
            allowed_extensions: default_allowed_extensions(),
            poll_interval_ms: default_poll_interval_ms(),
            validation_message: default_validation_message(),
            fallback_error_message: default_fallback_error_message(),
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Deployment that also ingests spreadsheets.
    pub fn spreadsheet_preset() -> Self {
        Self {
            allowed_extensions: [".pdf", ".xlsx", ".xlsm", ".xltx", ".xltm", ".csv"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            validation_message: "PDF, Excel, CSV 파일만 업로드할 수 있습니다.".to_string(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    /// Absolute URL of the multipart create endpoint.
    pub fn upload_url(&self) -> String {
        join_url(&self.api_base_url, &self.upload_path)
    }

    /// Absolute URL of the status endpoint for one job.
    pub fn job_url(&self, id: u64) -> String {
        format!("{}/{}", join_url(&self.api_base_url, &self.job_path), id)
    }
}

/// Normalizes an extension to lowercase with a single leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.').to_lowercase();
    format!(".{}", trimmed)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval_ms, 2500);
        assert_eq!(config.allowed_extensions, vec![".pdf"]);
        assert_eq!(config.validation_message, "PDF 파일만 업로드할 수 있습니다.");
    }

    #[test]
    fn test_urls_join_cleanly() {
        let config = ClientConfig {
            api_base_url: "https://search.example.com/api/".to_string(),
            upload_path: "/documents/upload".to_string(),
            job_path: "documents/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.upload_url(),
            "https://search.example.com/api/documents/upload"
        );
        assert_eq!(
            config.job_url(42),
            "https://search.example.com/api/documents/42"
        );
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("PDF"), ".pdf");
        assert_eq!(normalize_extension(".Xlsx "), ".xlsx");
        assert_eq!(normalize_extension("..csv"), ".csv");
    }

    #[test]
    fn test_spreadsheet_preset() {
        let config = ClientConfig::spreadsheet_preset();
        assert!(config.allowed_extensions.contains(&".xltm".to_string()));
        assert_eq!(config.allowed_extensions.len(), 6);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
