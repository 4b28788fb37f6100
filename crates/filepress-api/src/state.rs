//! Application state shared by every handler through `Arc<AppState>`.

use filepress_core::Config;
use filepress_processing::{CachedToolLocator, GhostscriptLocator, PdfCompressor, ToolLocator};
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub pdf_compressor: PdfCompressor,
}

impl AppState {
    /// Build state with the production Ghostscript lookup.
    pub fn new(config: Config) -> Self {
        let locator = GhostscriptLocator::new().with_explicit_path(config.ghostscript_path.clone());
        Self::with_locator(config, Arc::new(CachedToolLocator::new(locator)))
    }

    /// Build state around a caller-supplied tool locator.
    pub fn with_locator(config: Config, locator: Arc<dyn ToolLocator>) -> Self {
        let pdf_compressor = PdfCompressor::new(locator).with_timeout(config.pdf_timeout);
        Self {
            config,
            pdf_compressor,
        }
    }
}
