//! Error types module
//!
//! All failures a request can end in are unified under `AppError`. Each variant
//! describes its own HTTP presentation through the `ErrorMetadata` trait, so the
//! API layer only has to render what the error says about itself.
//!
//! Client-facing summaries are in Portuguese, matching the frontend that ships
//! with the service.

use std::io;

use crate::models::MediaKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for environment problems like a missing tool
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TOOL_NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Human-readable summary shown to the client
    fn client_message(&self) -> String;

    /// Technical detail attached to the response, if this error exposes one
    fn detail(&self) -> Option<String>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No `file` part in the form, or a part with an empty filename.
    #[error("Missing file (field present: {field_present})")]
    MissingFile { field_present: bool },

    #[error("Invalid format for '{filename}' (allowed: {allowed:?})")]
    InvalidFormat {
        filename: String,
        allowed: Vec<String>,
    },

    /// Body that could not be read as a multipart form.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Compression tool not found: {0}")]
    ToolNotFound(String),

    #[error("{media} compression failed: {detail}")]
    Compression { media: MediaKind, detail: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, exposes_detail, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MissingFile { .. } => (400, "MISSING_FILE", false, LogLevel::Debug),
        AppError::InvalidFormat { .. } => (400, "INVALID_FORMAT", false, LogLevel::Debug),
        AppError::InvalidRequest(_) => (400, "INVALID_REQUEST", false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", true, LogLevel::Debug),
        AppError::ToolNotFound(_) => (503, "TOOL_NOT_FOUND", true, LogLevel::Warn),
        AppError::Compression { .. } => (500, "COMPRESSION_FAILED", true, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

/// Format the allowed extensions the way the upload form words them:
/// a single extension reads "apenas .pdf", several read ".jpg, .jpeg ou .png".
fn describe_allowed(allowed: &[String]) -> String {
    let dotted: Vec<String> = allowed.iter().map(|ext| format!(".{}", ext)).collect();
    match dotted.as_slice() {
        [] => "um formato suportado".to_string(),
        [only] => format!("apenas {}", only),
        [head @ .., last] => format!("{} ou {}", head.join(", "), last),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingFile {
                field_present: false,
            } => "Nenhum arquivo enviado".to_string(),
            AppError::MissingFile {
                field_present: true,
            } => "Nenhum arquivo selecionado".to_string(),
            AppError::InvalidFormat { allowed, .. } => {
                format!("Formato inválido. Use {}", describe_allowed(allowed))
            }
            AppError::InvalidRequest(_) => "Requisição inválida".to_string(),
            AppError::PayloadTooLarge(_) => "Arquivo muito grande".to_string(),
            AppError::ToolNotFound(_) => "Ghostscript não encontrado".to_string(),
            AppError::Compression {
                media: MediaKind::Pdf,
                ..
            } => "Erro ao comprimir PDF".to_string(),
            AppError::Compression {
                media: MediaKind::Image,
                ..
            } => "Erro ao comprimir imagem".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Erro interno do servidor".to_string()
            }
        }
    }

    fn detail(&self) -> Option<String> {
        if !app_error_static_metadata(self).2 {
            return None;
        }
        match self {
            AppError::InvalidRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::ToolNotFound(msg)
            | AppError::Internal(msg) => Some(msg.clone()),
            AppError::Compression { detail, .. } => Some(detail.clone()),
            AppError::InternalWithSource { message, .. } => Some(message.clone()),
            AppError::MissingFile { .. } | AppError::InvalidFormat { .. } => None,
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
