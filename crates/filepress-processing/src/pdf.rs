//! PdfCompressor - rewrites a PDF through Ghostscript with downsampled images.

use crate::error::CompressionError;
use crate::tool_locator::ToolLocator;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Target resolution for color, gray and mono images, in DPI.
pub const IMAGE_RESOLUTION_DPI: u32 = 150;

/// JPEG quality Ghostscript uses when re-encoding embedded images (0-100).
pub const EMBEDDED_JPEG_QUALITY: u32 = 50;

pub struct PdfCompressor {
    locator: Arc<dyn ToolLocator>,
    timeout: Option<Duration>,
}

impl PdfCompressor {
    pub fn new(locator: Arc<dyn ToolLocator>) -> Self {
        Self {
            locator,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fixed Ghostscript argument list (everything after the executable).
    pub fn ghostscript_args(input_path: &Path, output_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-sDEVICE=pdfwrite".to_string(),
            "-dCompatibilityLevel=1.4".to_string(),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            "-dDownsampleColorImages=true".to_string(),
            format!("-dColorImageResolution={}", IMAGE_RESOLUTION_DPI),
            "-dDownsampleGrayImages=true".to_string(),
            format!("-dGrayImageResolution={}", IMAGE_RESOLUTION_DPI),
            "-dDownsampleMonoImages=true".to_string(),
            format!("-dMonoImageResolution={}", IMAGE_RESOLUTION_DPI),
            format!("-dJPEGQ={}", EMBEDDED_JPEG_QUALITY),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        let mut output_arg = OsString::from("-sOutputFile=");
        output_arg.push(output_path.as_os_str());
        args.push(output_arg);
        args.push(input_path.as_os_str().to_os_string());

        args
    }

    /// Compress `input_path` into `output_path`.
    ///
    /// Fails with `CompressionError::ToolNotFound` when Ghostscript cannot be
    /// located; that case is an environment problem rather than a bad input.
    #[tracing::instrument(
        skip(self, input_path, output_path),
        fields(input = %input_path.display(), output = %output_path.display())
    )]
    pub async fn compress(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), CompressionError> {
        let tool = self.locator.locate()?;
        let tool_name = tool.display().to_string();

        let mut command = Command::new(&tool);
        command
            .args(Self::ghostscript_args(input_path, output_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let run = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                CompressionError::Timeout {
                    tool: tool_name.clone(),
                    timeout: limit,
                }
            })?,
            None => run.await,
        }
        .map_err(|e| CompressionError::Failed(format!("Failed to execute {}: {}", tool_name, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CompressionError::ToolFailed {
                tool: tool_name,
                status: output.status,
                stderr,
            });
        }

        if !output_path.is_file() {
            return Err(CompressionError::Failed(format!(
                "{} exited successfully but wrote no output",
                tool_name
            )));
        }

        tracing::info!(tool = %tool_name, "PDF compressed successfully");
        Ok(())
    }
}
