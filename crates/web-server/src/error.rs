use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use intelligence::IntelligenceError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use thiserror::Error;

const MAX_MESSAGE_LEN: usize = 200;
const GENERIC_MESSAGE: &str = "An unexpected error occurred while computing analytics";

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z][a-zA-Z0-9+.-]*://\S+").expect("valid url regex"));
static PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[A-Za-z]:)?(?:[/\\][\w.-]+){2,}").expect("valid path regex"));
static HOST_PORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{1,3}(?:\.\d{1,3}){3}|localhost|[\w-]+(?:\.[\w-]+)+):\d{2,5}\b")
        .expect("valid host regex")
});

/// Strips URLs, filesystem paths and host:port pairs, then truncates.
pub fn sanitize_message(message: &str) -> String {
    let scrubbed = URL_PATTERN.replace_all(message, "[url]");
    let scrubbed = HOST_PORT_PATTERN.replace_all(&scrubbed, "[host]");
    let scrubbed = PATH_PATTERN.replace_all(&scrubbed, "[path]");

    let mut out: String = scrubbed.chars().take(MAX_MESSAGE_LEN).collect();
    if scrubbed.chars().count() > MAX_MESSAGE_LEN {
        out.push_str("...");
    }
    out
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Intelligence(#[from] IntelligenceError),
}

/// What an error looks like on the wire.
struct ErrorParts {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Vec<String>,
}

impl AppError {
    fn parts(&self) -> ErrorParts {
        match self {
            AppError::Intelligence(IntelligenceError::Validation(e)) => {
                // Each violation is scrubbed on its own so none is cut off by a later one.
                let details: Vec<String> = e.violations.iter().map(|v| sanitize_message(v)).collect();
                ErrorParts {
                    status: StatusCode::BAD_REQUEST,
                    code: "VALIDATION_ERROR",
                    message: format!("Invalid query parameters: {}", details.join("; ")),
                    details,
                }
            }
            AppError::Intelligence(IntelligenceError::NotFound(message)) => ErrorParts {
                status: StatusCode::NOT_FOUND,
                code: "NOT_FOUND",
                message: sanitize_message(message),
                details: Vec::new(),
            },
            AppError::Intelligence(other) => {
                tracing::error!(error = ?other, "Analytics request failed.");
                ErrorParts {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "INTERNAL_ERROR",
                    message: GENERIC_MESSAGE.to_string(),
                    details: Vec::new(),
                }
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = self.parts();
        let mut body = json!({
            "success": false,
            "error": parts.message,
            "code": parts.code,
            "timestamp": Utc::now(),
        });
        if !parts.details.is_empty() {
            body["details"] = json!(parts.details);
        }
        (parts.status, Json(body)).into_response()
    }
}
