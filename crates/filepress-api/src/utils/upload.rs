//! Common utilities for the compression handlers

use crate::constants::{COMPRESSED_SUFFIX, FILE_FIELD, QUALITY_FIELD};
use axum::{
    body::Body,
    extract::multipart::{Multipart, MultipartError},
    http::{header, Response, StatusCode},
};
use filepress_core::{AppError, CompressionResult, UploadedFile};
use filepress_processing::ImageFormat;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tempfile::TempDir;

/// Longest name, in UTF-8 bytes, written to the scratch directory. Leaves
/// room for `_comprimido.{ext}` under the usual 255-byte filesystem limit.
const MAX_STORED_NAME_BYTES: usize = 200;

/// Fields the compression form may carry.
#[derive(Debug)]
pub struct CompressionForm {
    pub file: UploadedFile,
    /// Raw `qualidade` value, parsed later by the image handler
    pub quality: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidRequest(err.body_text())
    }
}

/// Extract the `file` part and the optional `qualidade` field.
///
/// The first `file` part wins; later ones are drained and ignored. A part
/// with no or an empty filename counts as "field present, nothing selected".
pub async fn extract_compression_form(mut multipart: Multipart) -> Result<CompressionForm, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut file_field_present = false;
    let mut quality: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == FILE_FIELD {
            if file_field_present {
                continue;
            }
            file_field_present = true;

            let filename = field.file_name().map(declared_basename).unwrap_or_default();
            let content_type = field.content_type().map(|s: &str| s.to_string());
            let data = field.bytes().await.map_err(multipart_error)?;

            if !filename.is_empty() {
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
        } else if field_name == QUALITY_FIELD {
            quality = Some(field.text().await.map_err(multipart_error)?);
        }
    }

    let file = file.ok_or(AppError::MissingFile {
        field_present: file_field_present,
    })?;

    Ok(CompressionForm { file, quality })
}

/// Last path component of a client-declared filename. Some clients send
/// full Windows paths.
fn declared_basename(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .to_string()
}

/// Validate file extension against the endpoint's allowlist
pub fn validate_file_extension(file: &UploadedFile, allowed: &[String]) -> Result<(), AppError> {
    if !file.has_allowed_extension(allowed) {
        return Err(AppError::InvalidFormat {
            filename: file.filename.clone(),
            allowed: allowed.to_vec(),
        });
    }
    Ok(())
}

/// Sanitize a filename before it touches the filesystem.
///
/// Keeps alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are dropped and names too short to be meaningful become `file`.
/// Long names are cut to `MAX_STORED_NAME_BYTES`, keeping the extension.
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = declared_basename(filename)
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.len() < 3 {
        return "file".to_string();
    }

    if sanitized.len() <= MAX_STORED_NAME_BYTES {
        return sanitized.to_string();
    }

    match sanitized.rsplit_once('.') {
        Some((base, ext)) if ext.len() < MAX_STORED_NAME_BYTES / 2 => {
            let base = truncate_utf8(base, MAX_STORED_NAME_BYTES - ext.len() - 1);
            format!("{}.{}", base, ext)
        }
        _ => truncate_utf8(sanitized, MAX_STORED_NAME_BYTES).to_string(),
    }
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &s[..end]
}

/// `{base}_comprimido.{extension}`, where base drops only the final extension.
pub fn compressed_filename(filename: &str, extension: &str) -> String {
    let base = filename
        .rsplit_once('.')
        .map(|(base, _)| base)
        .unwrap_or(filename);
    format!("{}{}.{}", base, COMPRESSED_SUFFIX, extension)
}

/// MIME type of a compressed image, chosen from its declared extension.
pub fn image_content_type(extension: &str) -> &'static str {
    if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

/// Encoding the declared extension asks for: JPEG for `jpg`/`jpeg`, PNG otherwise.
pub fn image_format_for_extension(extension: &str) -> ImageFormat {
    if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
        ImageFormat::Jpeg
    } else {
        ImageFormat::Png
    }
}

/// `Content-Disposition` value for a download. Non-ASCII names get an ASCII
/// fallback plus an RFC 5987 `filename*` parameter.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(filename, NON_ALPHANUMERIC)
        )
    }
}

/// Fresh per-request scratch directory, removed when the handle drops.
pub fn scratch_dir() -> std::io::Result<TempDir> {
    tempfile::Builder::new().prefix("filepress-").tempdir()
}

/// Turn a finished compression into a downloadable attachment.
pub fn attachment_response(result: CompressionResult) -> Result<Response<Body>, AppError> {
    let disposition = content_disposition(&result.filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(header::CONTENT_DISPOSITION, disposition.as_str())
        .header(header::CONTENT_LENGTH, result.data.len())
        .body(Body::from(result.data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}
