//! ImageCompressor - re-encoding of PNG and JPEG uploads.
//!
//! The source format is sniffed from the file content, so a GIF renamed to
//! `.jpg` is rejected instead of silently producing nothing. The output format
//! is the caller's choice, normally the one the upload's extension names.

use crate::error::CompressionError;
use filepress_core::Quality;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

pub struct ImageCompressor;

impl ImageCompressor {
    /// Compress the image at `input_path` into `output_path` as `target`.
    ///
    /// PNG output is lossless and ignores `quality`. JPEG output is encoded
    /// at `quality`. Returns the sniffed source format.
    /// Blocking: call from `spawn_blocking` inside async code.
    pub fn compress(
        input_path: &Path,
        output_path: &Path,
        target: ImageFormat,
        quality: Quality,
    ) -> Result<ImageFormat, CompressionError> {
        let data = std::fs::read(input_path)?;
        let (source, compressed) = Self::compress_bytes(&data, target, quality)?;
        std::fs::write(output_path, &compressed)?;

        tracing::info!(
            source = ?source,
            target = ?target,
            quality = quality.value(),
            original_bytes = data.len(),
            compressed_bytes = compressed.len(),
            "Image compressed successfully"
        );

        Ok(source)
    }

    /// In-memory variant of [`ImageCompressor::compress`].
    pub fn compress_bytes(
        data: &[u8],
        target: ImageFormat,
        quality: Quality,
    ) -> Result<(ImageFormat, Vec<u8>), CompressionError> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

        let source = match reader.format() {
            Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
            other => {
                let detected = other
                    .map(|f| format!("{:?}", f))
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(detected = %detected, "Unsupported image format");
                return Err(CompressionError::UnsupportedFormat(detected));
            }
        };

        let img = reader.decode()?;
        let encoded = match target {
            ImageFormat::Png => Self::compress_png(&img)?,
            ImageFormat::Jpeg => Self::compress_jpeg(&img, quality)?,
            other => return Err(CompressionError::UnsupportedFormat(format!("{:?}", other))),
        };

        Ok((source, encoded))
    }

    /// Lossless PNG with the strongest deflate setting and adaptive filtering.
    fn compress_png(img: &DynamicImage) -> Result<Vec<u8>, CompressionError> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
        img.write_with_encoder(encoder)?;
        Ok(buffer)
    }

    /// Compress to JPEG using mozjpeg
    fn compress_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CompressionError> {
        let (width, height) = img.dimensions();

        let (color_space, pixels) = match img {
            DynamicImage::ImageLuma8(gray) => {
                (mozjpeg::ColorSpace::JCS_GRAYSCALE, gray.as_raw().clone())
            }
            _ => (mozjpeg::ColorSpace::JCS_RGB, img.to_rgb8().into_raw()),
        };

        let mut comp = mozjpeg::Compress::new(color_space);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality.value() as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp.start_compress(Vec::new())?;
        comp.write_scanlines(&pixels)?;
        let jpeg_data = comp.finish()?;

        Ok(jpeg_data)
    }
}
