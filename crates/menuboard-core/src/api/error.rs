use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Postgres error code for an insufficient-privilege (row-level security) denial
const PG_INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Postgres error code for a table that does not exist
const PG_UNDEFINED_TABLE: &str = "42P01";

/// Error body returned by the REST layer in front of the database
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl StoreErrorBody {
    fn describe(&self) -> Option<String> {
        let message = self.message.as_deref()?;
        let mut text = match self.code.as_deref() {
            Some(code) => format!("{} ({})", message, code),
            None => message.to_string(),
        };
        if let Some(ref details) = self.details {
            text.push_str(": ");
            text.push_str(details);
        }
        if let Some(ref hint) = self.hint {
            text.push_str(" hint: ");
            text.push_str(hint);
        }
        Some(text)
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<StoreErrorBody>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(StoreErrorBody::describe)
            .map(|m| Self::truncate_body(&m))
            .unwrap_or_else(|| Self::truncate_body(body));

        match parsed.as_ref().and_then(|p| p.code.as_deref()) {
            Some(PG_INSUFFICIENT_PRIVILEGE) => return ApiError::AccessDenied(message),
            Some(PG_UNDEFINED_TABLE) => return ApiError::NotFound(message),
            _ => {}
        }

        match status.as_u16() {
            401 | 403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            500..=599 => ApiError::ServerError(message),
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    /// True when the store could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }
}
