//! Compression API integration tests.
//!
//! Run with: `cargo test -p filepress-api --test compress_test`
//! No Ghostscript needed: PDF tests use a fixed locator and, on Unix, a shell
//! script standing in for the real tool.

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use filepress_core::Config;
use helpers::{fixtures, server_with, server_without_ghostscript, FixedLocator};
use image::ImageFormat;
use std::sync::Arc;

fn file_form(filename: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(data).file_name(filename))
}

#[tokio::test]
async fn test_health_at_root_and_prefix() {
    let server = server_without_ghostscript();

    for path in ["/health", "/api/health"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), 200, "path {}", path);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Compressor API está rodando");
    }
}

#[tokio::test]
async fn test_pdf_without_ghostscript_is_service_unavailable() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/pdf")
        .multipart(file_form("report.pdf", fixtures::create_test_pdf()))
        .await;

    assert_eq!(response.status_code(), 503);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Ghostscript não encontrado");
    assert!(body["detail"].as_str().unwrap().contains("Ghostscript"));
}

#[tokio::test]
async fn test_pdf_rejects_other_extensions() {
    let server = server_without_ghostscript();

    for name in ["notes.txt", "report", "report.pdf.exe"] {
        let response = server
            .post("/compress/pdf")
            .multipart(file_form(name, fixtures::create_test_pdf()))
            .await;

        assert_eq!(response.status_code(), 400, "filename {}", name);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Formato inválido. Use apenas .pdf");
        assert!(body.get("detail").is_none());
    }
}

#[tokio::test]
async fn test_missing_file_field() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(MultipartForm::new().add_text("qualidade", "50"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Nenhum arquivo enviado");
}

#[tokio::test]
async fn test_request_without_multipart_body() {
    let server = server_without_ghostscript();

    let response = server.post("/compress/pdf").await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Nenhum arquivo enviado");
}

#[tokio::test]
async fn test_file_field_without_filename() {
    let server = server_without_ghostscript();

    let form = MultipartForm::new().add_part("file", Part::bytes(fixtures::create_test_pdf()));
    let response = server.post("/compress/pdf").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Nenhum arquivo selecionado");
}

#[tokio::test]
async fn test_png_keeps_name_case_and_format() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(file_form("photo.PNG", fixtures::create_test_png(64, 64)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"photo_comprimido.PNG\""
    );
    let format = image::guess_format(response.as_bytes()).unwrap();
    assert_eq!(format, ImageFormat::Png);
}

#[tokio::test]
async fn test_jpeg_honors_low_quality() {
    let server = server_without_ghostscript();
    let original = fixtures::create_test_jpeg(160, 120);

    let low = server
        .post("/compress/image")
        .multipart(file_form("x.jpeg", original.clone()).add_text("qualidade", "5"))
        .await;
    let high = server
        .post("/compress/image")
        .multipart(file_form("x.jpeg", original).add_text("qualidade", "95"))
        .await;

    assert_eq!(low.status_code(), 200);
    assert_eq!(low.header("content-type"), "image/jpeg");
    assert_eq!(
        low.header("content-disposition"),
        "attachment; filename=\"x_comprimido.jpeg\""
    );
    let decoded = image::load_from_memory(low.as_bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (160, 120));
    assert!(low.as_bytes().len() < high.as_bytes().len());
}

#[tokio::test]
async fn test_unparseable_quality_uses_default() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(file_form("photo.jpg", fixtures::create_test_jpeg(32, 32)).add_text("qualidade", "alta"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(image::guess_format(response.as_bytes()).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_recompressing_output_succeeds() {
    let server = server_without_ghostscript();

    let first = server
        .post("/compress/image")
        .multipart(file_form("photo.jpg", fixtures::create_test_jpeg(48, 48)))
        .await;
    assert_eq!(first.status_code(), 200);

    let second = server
        .post("/compress/image")
        .multipart(file_form("photo_comprimido.jpg", first.as_bytes().to_vec()))
        .await;
    assert_eq!(second.status_code(), 200);
    assert_eq!(
        second.header("content-disposition"),
        "attachment; filename=\"photo_comprimido_comprimido.jpg\""
    );
    assert!(image::load_from_memory(second.as_bytes()).is_ok());
}

#[tokio::test]
async fn test_png_named_jpg_comes_back_as_jpeg() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(file_form("photo.jpg", fixtures::create_test_png(40, 30)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"photo_comprimido.jpg\""
    );
    assert_eq!(image::guess_format(response.as_bytes()).unwrap(), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(response.as_bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[tokio::test]
async fn test_long_multibyte_filename_is_accepted() {
    let server = server_without_ghostscript();
    let filename = format!("{}.png", "名".repeat(85));

    let response = server
        .post("/compress/image")
        .multipart(file_form(&filename, fixtures::create_test_png(16, 16)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
    let disposition = response.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.contains("filename*=UTF-8''"));
    assert_eq!(image::guess_format(response.as_bytes()).unwrap(), ImageFormat::Png);
}

#[tokio::test]
async fn test_huge_quality_saturates() {
    let server = server_without_ghostscript();
    let original = fixtures::create_test_jpeg(96, 96);

    let huge = server
        .post("/compress/image")
        .multipart(
            file_form("x.jpg", original.clone()).add_text("qualidade", "99999999999999999999"),
        )
        .await;
    let max = server
        .post("/compress/image")
        .multipart(file_form("x.jpg", original).add_text("qualidade", "100"))
        .await;

    assert_eq!(huge.status_code(), 200);
    assert_eq!(huge.as_bytes(), max.as_bytes());
}

#[tokio::test]
async fn test_gif_renamed_to_jpg_fails() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(file_form("anim.jpg", fixtures::create_test_gif()))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Erro ao comprimir imagem");
    assert!(body["detail"].as_str().unwrap().contains("Gif"));
}

#[tokio::test]
async fn test_image_rejects_other_extensions() {
    let server = server_without_ghostscript();

    let response = server
        .post("/compress/image")
        .multipart(file_form("anim.gif", fixtures::create_test_gif()))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Formato inválido. Use .jpg, .jpeg ou .png");
}

#[tokio::test]
async fn test_api_prefix_serves_compression() {
    let server = server_without_ghostscript();

    let response = server
        .post("/api/compress/image")
        .multipart(file_form("logo.png", fixtures::create_test_png(16, 16)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/png");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let config = Config {
        max_upload_size_bytes: 1024,
        ..Config::default()
    };
    let server = server_with(config, Arc::new(FixedLocator(None)));

    let response = server
        .post("/compress/image")
        .multipart(file_form("big.png", vec![0u8; 64 * 1024]))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Arquivo muito grande");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = server_without_ghostscript();

    let response = server
        .get("/health")
        .add_header("X-Request-ID", "req-123")
        .await;
    assert_eq!(response.header("x-request-id"), "req-123");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let server = server_without_ghostscript();

    let response = server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/compress/pdf"].is_object());
    assert!(body["paths"]["/compress/image"].is_object());
}

#[cfg(unix)]
#[tokio::test]
async fn test_pdf_success_returns_attachment() {
    let tools = tempfile::tempdir().unwrap();
    let gs = fixtures::fake_ghostscript(tools.path(), fixtures::COPYING_GHOSTSCRIPT);
    let server = helpers::server_with_tool(gs);
    let pdf = fixtures::create_test_pdf();

    let response = server
        .post("/compress/pdf")
        .multipart(file_form("relatorio 100%.pdf", pdf.clone()))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"relatorio 100%_comprimido.pdf\""
    );
    assert_eq!(response.as_bytes().to_vec(), pdf);
}

#[cfg(unix)]
#[tokio::test]
async fn test_pdf_uppercase_extension_is_accepted() {
    let tools = tempfile::tempdir().unwrap();
    let gs = fixtures::fake_ghostscript(tools.path(), fixtures::COPYING_GHOSTSCRIPT);
    let server = helpers::server_with_tool(gs);

    let response = server
        .post("/api/compress/pdf")
        .multipart(file_form("SCAN.PDF", fixtures::create_test_pdf()))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"SCAN_comprimido.pdf\""
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_pdf_tool_failure_is_internal_error() {
    let tools = tempfile::tempdir().unwrap();
    let gs = fixtures::fake_ghostscript(tools.path(), fixtures::FAILING_GHOSTSCRIPT);
    let server = helpers::server_with_tool(gs);

    let response = server
        .post("/compress/pdf")
        .multipart(file_form("broken.pdf", b"not really a pdf".to_vec()))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Erro ao comprimir PDF");
    assert!(body["detail"].as_str().unwrap().contains("syntaxerror"));
}
