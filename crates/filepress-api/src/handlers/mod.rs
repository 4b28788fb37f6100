pub mod compress_image;
pub mod compress_pdf;
pub mod health;
