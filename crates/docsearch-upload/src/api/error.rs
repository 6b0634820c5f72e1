//! Document API error types.

use thiserror::Error;

/// Longest error body excerpt written to the log.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Errors from calls to the document API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Server returned HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Http { status: u16, detail: Option<String> },

    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The HTTP client could not be built or the request could not be formed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    /// Server-provided `detail`, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Http {
                detail: Some(detail),
                ..
            } => Some(detail),
            _ => None,
        }
    }

    /// Message to show the user: the server's `detail`, else `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail().unwrap_or(fallback)
    }

    /// Returns true if the error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500 || *status == 429,
            ApiError::Decode(_) | ApiError::Client(_) => false,
        }
    }
}

/// Extracts the `detail` string from an error body.
///
/// Bodies that are not JSON, lack `detail`, or carry a non-string or blank
/// `detail` yield `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();
    if detail.is_empty() {
        None
    } else {
        Some(detail.to_string())
    }
}

/// Truncates a raw body for logging.
pub fn truncate_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "파일이 너무 큽니다"}"#),
            Some("파일이 너무 큽니다".to_string())
        );
        assert_eq!(extract_detail(r#"{"detail": "  "}"#), None);
        assert_eq!(extract_detail(r#"{"detail": [{"msg": "bad"}]}"#), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
        assert_eq!(extract_detail("<html>502</html>"), None);
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::Http {
            status: 400,
            detail: Some("Duplicate document".to_string()),
        };
        assert_eq!(err.user_message("fallback"), "Duplicate document");

        let err = ApiError::Http {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message("fallback"), "fallback");

        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ApiError::Network("timeout".into()).is_retryable());
        assert!(ApiError::Http {
            status: 503,
            detail: None
        }
        .is_retryable());
        assert!(!ApiError::Http {
            status: 404,
            detail: None
        }
        .is_retryable());
        assert!(!ApiError::Decode("bad json".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ApiError::Http {
            status: 413,
            detail: Some("too large".into()),
        };
        assert_eq!(err.to_string(), "Server returned HTTP 413: too large");
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "가".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("... (truncated)"));
        assert!(truncate_body("short").eq("short"));
    }
}
