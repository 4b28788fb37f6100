//! Filepress API Library
//!
//! HTTP handlers, middleware, and application setup for the compression service.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use state::AppState;
