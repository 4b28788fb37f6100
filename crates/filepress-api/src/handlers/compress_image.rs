use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use filepress_core::{AppError, CompressionJob, CompressionResult, MediaKind, Quality, UploadedFile};
use filepress_processing::{CompressionError, ImageCompressor};

use crate::error::{compression_failure, ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{
    attachment_response, compressed_filename, extract_compression_form, image_content_type,
    image_format_for_extension, sanitize_filename, scratch_dir, validate_file_extension,
};

/// Compress image handler
///
/// Re-encodes a PNG or JPEG into the format its extension names. The optional
/// `qualidade` field (1-100, default 40) only affects JPEG output.
#[utoipa::path(
    post,
    path = "/compress/image",
    tag = "compression",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "Form with the image in `file` and an optional integer `qualidade`"
    ),
    responses(
        (status = 200, description = "Compressed image as an attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Missing file or invalid extension", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Compression failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(operation = "compress_image", filename = tracing::field::Empty)
)]
pub async fn compress_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let multipart = multipart.map_err(|_| AppError::MissingFile {
        field_present: false,
    })?;
    let form = extract_compression_form(multipart).await?;
    let upload = form.file;
    tracing::Span::current().record("filename", upload.filename.as_str());
    tracing::debug!(
        declared_content_type = ?upload.content_type,
        size = upload.data.len(),
        "Image upload received"
    );

    validate_file_extension(&upload, &state.config.image_allowed_extensions)?;

    let quality = Quality::from_form_value(form.quality.as_deref());
    let extension = upload.extension().unwrap_or_default().to_string();

    let compressed = run_image_job(&upload, &extension, quality)
        .await
        .map_err(|e| compression_failure(e, MediaKind::Image))?;

    tracing::info!(
        quality = quality.value(),
        original_bytes = upload.data.len(),
        compressed_bytes = compressed.len(),
        "Image compression finished"
    );

    let response = attachment_response(CompressionResult {
        data: compressed,
        filename: compressed_filename(&upload.filename, &extension),
        content_type: image_content_type(&extension),
    })?;

    Ok(response)
}

async fn run_image_job(
    upload: &UploadedFile,
    extension: &str,
    quality: Quality,
) -> Result<Vec<u8>, CompressionError> {
    let workdir = scratch_dir()?;
    let stored_name = sanitize_filename(&upload.filename);
    let job = CompressionJob::new(
        workdir.path(),
        &stored_name,
        &compressed_filename(&stored_name, extension),
        MediaKind::Image,
    )
    .with_quality(quality);

    tokio::fs::write(&job.input_path, &upload.data).await?;

    // Decoding and encoding are CPU-bound
    let input = job.input_path.clone();
    let output = job.output_path.clone();
    let quality = job.quality.unwrap_or_default();
    let target = image_format_for_extension(extension);
    let source = tokio::task::spawn_blocking(move || {
        ImageCompressor::compress(&input, &output, target, quality)
    })
    .await
    .map_err(|e| CompressionError::Failed(format!("Image compression task failed: {}", e)))??;
    tracing::debug!(media = %job.media, source = ?source, target = ?target, "Image re-encoded");

    let compressed = tokio::fs::read(&job.output_path).await?;
    Ok(compressed)
}
