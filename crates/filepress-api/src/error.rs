//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` renders through the same status/body/logging path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use filepress_core::{AppError, ErrorMetadata, LogLevel, MediaKind};
use filepress_processing::CompressionError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Short summary meant for end users
    pub error: String,
    /// Technical detail; omitted for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from filepress-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Map a compressor failure onto the endpoint it happened in.
///
/// A missing tool is its own 503; everything else is a 500 carrying the
/// compressor's message as detail.
pub fn compression_failure(err: CompressionError, media: MediaKind) -> AppError {
    match err {
        CompressionError::ToolNotFound(not_found) => AppError::ToolNotFound(not_found.to_string()),
        other => AppError::Compression {
            media,
            detail: other.to_string(),
        },
    }
}

fn log_error(error: &AppError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            detail: app_error.detail(),
        });

        (status, body).into_response()
    }
}
