use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the request and supplied a display message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the backend: `{"statusCode": ..., "message": "...", "error": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return ApiError::Rejected {
                status: status.as_u16(),
                message: parsed.message,
            };
        }
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Display message supplied by the server, if any.
    ///
    /// Network failures and unexpected body shapes yield `None`; callers fall
    /// back to their own generic message.
    pub fn display_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_server_message() {
        let body = r#"{"statusCode":401,"message":"Credenciales inválidas","error":"Unauthorized"}"#;
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.display_message(), Some("Credenciales inválidas"));
        assert_eq!(err.to_string(), "Credenciales inválidas");
    }

    #[test]
    fn test_from_status_unexpected_shape_has_no_display_message() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "<html>nope</html>");
        assert_eq!(err.display_message(), None);

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream dead");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert_eq!(err.display_message(), None);
    }

    #[test]
    fn test_truncates_oversized_bodies() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let text = err.to_string();
        assert!(text.len() < body.len());
        assert!(text.contains("truncated"));
    }
}
