use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use filepress_core::{AppError, CompressionJob, CompressionResult, MediaKind, UploadedFile};
use filepress_processing::CompressionError;

use crate::error::{compression_failure, ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    attachment_response, compressed_filename, extract_compression_form, sanitize_filename,
    scratch_dir, validate_file_extension,
};

/// Compress PDF handler
///
/// Rewrites the uploaded PDF through Ghostscript with downsampled images and
/// returns it as `{base}_comprimido.pdf`.
///
/// # Errors
/// - `AppError::MissingFile` / `AppError::InvalidFormat` - bad upload (400)
/// - `AppError::PayloadTooLarge` - body over the configured limit (413)
/// - `AppError::ToolNotFound` - Ghostscript is not installed (503)
/// - `AppError::Compression` - Ghostscript failed or produced nothing (500)
#[utoipa::path(
    post,
    path = "/compress/pdf",
    tag = "compression",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Form with the PDF in the `file` field"
    ),
    responses(
        (status = 200, description = "Compressed PDF as an attachment", content_type = "application/pdf"),
        (status = 400, description = "Missing file or invalid extension", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Compression failed", body = ErrorResponse),
        (status = 503, description = "Ghostscript not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(operation = "compress_pdf", filename = tracing::field::Empty)
)]
pub async fn compress_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let multipart = multipart.map_err(|_| AppError::MissingFile {
        field_present: false,
    })?;
    let upload = extract_compression_form(multipart).await?.file;
    tracing::Span::current().record("filename", upload.filename.as_str());
    tracing::debug!(
        declared_content_type = ?upload.content_type,
        size = upload.data.len(),
        "PDF upload received"
    );

    validate_file_extension(&upload, &state.config.pdf_allowed_extensions)?;

    let compressed = run_pdf_job(&state, &upload)
        .await
        .map_err(|e| compression_failure(e, MediaKind::Pdf))?;

    tracing::info!(
        original_bytes = upload.data.len(),
        compressed_bytes = compressed.len(),
        "PDF compression finished"
    );

    let response = attachment_response(CompressionResult {
        data: compressed,
        filename: compressed_filename(&upload.filename, "pdf"),
        content_type: "application/pdf",
    })?;

    Ok(response)
}

/// Runs one Ghostscript pass inside a scratch directory and returns the
/// output bytes. The directory is gone once this returns, on every path.
async fn run_pdf_job(state: &AppState, upload: &UploadedFile) -> Result<Vec<u8>, CompressionError> {
    let workdir = scratch_dir()?;
    let stored_name = sanitize_filename(&upload.filename);
    let job = CompressionJob::new(
        workdir.path(),
        &stored_name,
        &compressed_filename(&stored_name, "pdf"),
        MediaKind::Pdf,
    );

    tokio::fs::write(&job.input_path, &upload.data).await?;
    tracing::debug!(media = %job.media, input = %job.input_path.display(), "Compression job prepared");
    state
        .pdf_compressor
        .compress(&job.input_path, &job.output_path)
        .await?;

    let compressed = tokio::fs::read(&job.output_path).await?;
    Ok(compressed)
}
