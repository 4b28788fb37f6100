//! Request-scoped domain models.
//!
//! Nothing here outlives a request: an upload is validated, turned into a job
//! backed by a temporary directory, and the job's output becomes a result that
//! is written to the response and dropped.

use std::fmt;
use std::path::{Path, PathBuf};

/// Which endpoint family a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Image,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Pdf => write!(f, "PDF"),
            MediaKind::Image => write!(f, "Image"),
        }
    }
}

/// Re-encoding quality on the 1-100 scale.
///
/// Always in range: every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 40;

    /// Clamp any integer into 1..=100.
    pub fn clamped(value: i64) -> Self {
        Quality(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    /// Parse the raw `qualidade` form value. Absent or non-numeric input
    /// falls back to the default. Integers of any size clamp, including ones
    /// too large for `i64`.
    pub fn from_form_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::default();
        };

        match raw.parse::<i64>() {
            Ok(value) => Self::clamped(value),
            Err(_) if is_integer_literal(raw) => {
                if raw.starts_with('-') {
                    Quality(Self::MIN)
                } else {
                    Quality(Self::MAX)
                }
            }
            Err(_) => Self::default(),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Optionally signed run of ASCII digits.
fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl Default for Quality {
    fn default() -> Self {
        Quality(Self::DEFAULT)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw upload as received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Extension after the last dot, as declared (case preserved).
    /// `None` when the filename has no dot at all.
    pub fn extension(&self) -> Option<&str> {
        self.filename.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// Filename without its final extension.
    pub fn base_name(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(&self.filename)
    }

    /// True if the extension matches one of `allowed`, ignoring case.
    pub fn has_allowed_extension(&self, allowed: &[String]) -> bool {
        self.extension()
            .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// One compression run: where the input lives, where the output goes.
#[derive(Debug, Clone)]
pub struct CompressionJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub media: MediaKind,
    /// Only meaningful for images; PDFs use fixed tool settings.
    pub quality: Option<Quality>,
}

impl CompressionJob {
    pub fn new(workdir: &Path, input_name: &str, output_name: &str, media: MediaKind) -> Self {
        Self {
            input_path: workdir.join(input_name),
            output_path: workdir.join(output_name),
            media,
            quality: None,
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Compressed bytes ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}
