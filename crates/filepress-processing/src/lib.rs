//! Filepress Processing Library
//!
//! Compression back ends: Ghostscript discovery and invocation for PDFs, and
//! in-process re-encoding for PNG and JPEG images.

pub mod error;
pub mod pdf;
pub mod raster;
pub mod tool_locator;

// Re-export commonly used types
pub use error::CompressionError;
pub use pdf::PdfCompressor;
pub use image::ImageFormat;
pub use raster::ImageCompressor;
pub use tool_locator::{CachedToolLocator, GhostscriptLocator, ToolLocator, ToolNotFound};
