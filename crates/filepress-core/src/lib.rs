//! Filepress Core Library
//!
//! This crate provides the configuration, error taxonomy, and request-scoped
//! models shared by the processing and API crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{CompressionJob, CompressionResult, MediaKind, Quality, UploadedFile};
