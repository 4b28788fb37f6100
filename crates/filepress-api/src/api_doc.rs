//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filepress API",
        version = "0.1.0",
        description = "Compresses PDF (through Ghostscript), JPEG and PNG uploads and returns the result as a download. Every path is also available under /api."
    ),
    paths(
        handlers::health::health_check,
        handlers::compress_pdf::compress_pdf,
        handlers::compress_image::compress_image,
    ),
    components(schemas(error::ErrorResponse, handlers::health::HealthResponse)),
    tags(
        (name = "compression", description = "PDF and image compression"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
