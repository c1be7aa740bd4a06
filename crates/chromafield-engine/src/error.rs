use std::fmt;
use std::path::PathBuf;

/// Pipeline stage an error originated from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Validation,
    Context,
    Shader,
    Geometry,
    Target,
    Command,
    Readback,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "validation",
            Stage::Context => "context",
            Stage::Shader => "shader",
            Stage::Geometry => "geometry",
            Stage::Target => "render target",
            Stage::Command => "command list",
            Stage::Readback => "readback",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// Underlying cause of an export failure.
#[derive(Debug)]
pub enum ExportSource {
    Io(std::io::Error),
    Tiff(tiff::TiffError),
}

impl fmt::Display for ExportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportSource::Io(e) => write!(f, "{e}"),
            ExportSource::Tiff(e) => write!(f, "{e}"),
        }
    }
}

/// Every failure the render pipeline can report.
///
/// None of these are retried; the caller decides how to present them.
#[derive(Debug)]
pub enum RenderError {
    /// A requested dimension was zero. Raised before any context exists.
    InvalidDimensions { width: u32, height: u32 },
    /// No adapter or device could be acquired.
    Context { reason: String },
    /// Shader module or pipeline creation failed.
    Shader { label: String, diagnostic: String },
    /// Vertex/index upload failed or the mesh was malformed.
    Geometry { reason: String },
    /// The render target could not be allocated at the requested size.
    TargetIncomplete {
        width: u32,
        height: u32,
        reason: String,
    },
    /// The command list was rejected before submission.
    Command { reason: String },
    /// Pixels could not be copied back to host memory.
    Readback {
        width: u32,
        height: u32,
        reason: String,
    },
    /// The image file could not be encoded or written.
    Export { path: PathBuf, source: ExportSource },
}

impl RenderError {
    /// Returns the stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            RenderError::InvalidDimensions { .. } => Stage::Validation,
            RenderError::Context { .. } => Stage::Context,
            RenderError::Shader { .. } => Stage::Shader,
            RenderError::Geometry { .. } => Stage::Geometry,
            RenderError::TargetIncomplete { .. } => Stage::Target,
            RenderError::Command { .. } => Stage::Command,
            RenderError::Readback { .. } => Stage::Readback,
            RenderError::Export { .. } => Stage::Export,
        }
    }

    pub(crate) fn context(reason: impl Into<String>) -> Self {
        RenderError::Context { reason: reason.into() }
    }

    pub(crate) fn command(reason: impl Into<String>) -> Self {
        RenderError::Command { reason: reason.into() }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidDimensions { width, height } => write!(
                f,
                "invalid output dimensions {width}x{height}: width and height must be at least 1"
            ),
            RenderError::Context { reason } => {
                write!(f, "failed to create rendering context: {reason}")
            }
            RenderError::Shader { label, diagnostic } => {
                write!(f, "shader '{label}' failed to compile: {diagnostic}")
            }
            RenderError::Geometry { reason } => write!(f, "geometry upload failed: {reason}"),
            RenderError::TargetIncomplete { width, height, reason } => write!(
                f,
                "render target {width}x{height} is incomplete: {reason}"
            ),
            RenderError::Command { reason } => write!(f, "invalid command list: {reason}"),
            RenderError::Readback { width, height, reason } => {
                write!(f, "readback of {width}x{height} pixels failed: {reason}")
            }
            RenderError::Export { path, source } => {
                write!(f, "failed to write image '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Export { source: ExportSource::Io(e), .. } => Some(e),
            RenderError::Export { source: ExportSource::Tiff(e), .. } => Some(e),
            _ => None,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn target_error_names_requested_dimensions() {
        let err = RenderError::TargetIncomplete {
            width: 40_000,
            height: 30_000,
            reason: "exceeds max texture dimension 16384".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("40000x30000"), "{msg}");
        assert!(msg.contains("16384"), "{msg}");
        assert_eq!(err.stage(), Stage::Target);
    }

    #[test]
    fn invalid_dimensions_is_a_validation_error() {
        let err = RenderError::InvalidDimensions { width: 0, height: 4 };
        assert_eq!(err.stage(), Stage::Validation);
        assert!(err.to_string().contains("0x4"));
    }

    #[test]
    fn export_error_exposes_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = RenderError::Export {
            path: PathBuf::from("/out/image.tiff"),
            source: ExportSource::Io(io),
        };
        assert_eq!(err.stage(), Stage::Export);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/out/image.tiff"));
    }

    #[test]
    fn non_export_errors_have_no_source() {
        assert!(RenderError::context("no adapter").source().is_none());
    }
}
