//! Application-wide constants.

/// Prefix the bundled frontend calls the API under. Routes are also served at the root.
pub const API_PREFIX: &str = "/api";

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the JPEG quality.
pub const QUALITY_FIELD: &str = "qualidade";

/// Suffix appended to the base name of every compressed download.
pub const COMPRESSED_SUFFIX: &str = "_comprimido";
