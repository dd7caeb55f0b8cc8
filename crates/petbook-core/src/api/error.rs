use serde::Deserialize;
use thiserror::Error;

/// Failure of one external API call.
///
/// `Clone` because the cache hands a single failure to every reader
/// collapsed onto the same request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx response; the message is the server's, or `HTTP <status>`
    /// when the body carried none.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

// Error body: { "error": { "code": ..., "message": ..., "fields": [...] } }
// Allow dead code: parsed for shape-completeness, only message is surfaced
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    fields: Vec<FieldDetail>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FieldDetail {
    field: String,
    message: String,
}

impl ApiError {
    /// Build the error for a non-2xx response, surfacing the body's
    /// `error.message` verbatim when present.
    pub fn from_response_body(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        ApiError::Http { status: status.as_u16(), message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_server_message_surfaces_verbatim() {
        let body = r#"{"error":{"code":"validation_error","message":"Datos inválidos","fields":[{"field":"nombre","message":"min"}]}}"#;
        let err = ApiError::from_response_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.to_string(), "Datos inválidos");
        assert_eq!(err, ApiError::Http { status: 400, message: "Datos inválidos".to_string() });
    }

    #[test]
    fn test_status_fallback_without_body() {
        let err = ApiError::from_response_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_status_fallback_on_unexpected_body() {
        let err = ApiError::from_response_body(StatusCode::NOT_FOUND, "<html>gateway</html>");
        assert_eq!(err.to_string(), "HTTP 404");

        let err = ApiError::from_response_body(StatusCode::NOT_FOUND, r#"{"error":{"code":"x","message":""}}"#);
        assert_eq!(err.to_string(), "HTTP 404");
    }
}
