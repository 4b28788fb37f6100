//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p filepress-api --test compress_test`.

pub mod fixtures;

use axum_test::TestServer;
use filepress_api::setup::routes;
use filepress_api::AppState;
use filepress_core::Config;
use filepress_processing::{ToolLocator, ToolNotFound};
use std::path::PathBuf;
use std::sync::Arc;

/// Locator that always answers the same way, so tests never depend on the
/// host having Ghostscript installed.
pub struct FixedLocator(pub Option<PathBuf>);

impl ToolLocator for FixedLocator {
    fn locate(&self) -> Result<PathBuf, ToolNotFound> {
        self.0.clone().ok_or_else(|| ToolNotFound {
            tool: "Ghostscript".to_string(),
            candidates: vec![
                "gswin64c".to_string(),
                "gswin32c".to_string(),
                "gs".to_string(),
            ],
        })
    }
}

/// Server whose PDF endpoint sees no Ghostscript.
pub fn server_without_ghostscript() -> TestServer {
    server_with(Config::default(), Arc::new(FixedLocator(None)))
}

/// Server whose PDF endpoint runs `tool` as Ghostscript.
pub fn server_with_tool(tool: PathBuf) -> TestServer {
    server_with(Config::default(), Arc::new(FixedLocator(Some(tool))))
}

pub fn server_with(config: Config, locator: Arc<dyn ToolLocator>) -> TestServer {
    let state = Arc::new(AppState::with_locator(config.clone(), locator));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    TestServer::new(app).expect("Failed to create test server")
}
