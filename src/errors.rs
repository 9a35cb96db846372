// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the pixel-format conversion pipeline

use std::fmt;

/// Result type alias used throughout the crate
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Closed set of failure conditions a conversion call can report.
///
/// Every variant corresponds to one precondition or GPU-lifecycle failure
/// described by the converter's contract; there is no variant for a
/// condition the converter cannot distinguish at the point it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// `src.pixelFormat` is not in the set of accepted input formats.
    InvalidInputFormat,
    /// `dst.pixelFormat` is not in the set of accepted output formats.
    InvalidOutputFormat,
    /// `src.width`, `src.height`, `dst.width` or `dst.height` is zero.
    InvalidInputResolution,
    /// Reserved for future upper-bound resolution checks.
    InvalidOutputResolution,
    /// The GPU API instance could not be created (driver absent or a
    /// required extension is unsupported).
    DriverNotFound,
    /// Device creation failed after a candidate adapter was picked.
    InvalidDevice,
    /// No adapter scored above zero during selection.
    NoSuitableDevice,
    /// A buffer allocation returned an out-of-memory condition.
    AllocationFailed,
    /// The GLSL/WGSL shader failed to compile.
    ShaderCompilationFailed(String),
    /// Any other unexpected failure path.
    Unknown(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::InvalidInputFormat => write!(f, "input pixel format is not supported"),
            ConvertError::InvalidOutputFormat => write!(f, "output pixel format is not supported"),
            ConvertError::InvalidInputResolution => {
                write!(f, "source or destination width/height must be non-zero")
            }
            ConvertError::InvalidOutputResolution => {
                write!(f, "destination resolution is not valid")
            }
            ConvertError::DriverNotFound => write!(f, "no compatible GPU driver found"),
            ConvertError::InvalidDevice => write!(f, "failed to create logical GPU device"),
            ConvertError::NoSuitableDevice => write!(f, "no suitable compute-capable GPU adapter"),
            ConvertError::AllocationFailed => write!(f, "GPU buffer allocation failed"),
            ConvertError::ShaderCompilationFailed(msg) => {
                write!(f, "shader compilation failed: {}", msg)
            }
            ConvertError::Unknown(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<wgpu::RequestDeviceError> for ConvertError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        ConvertError::InvalidDevice.with_context(err)
    }
}

impl ConvertError {
    /// Attach additional context to an error without changing its kind,
    /// matching the log-then-propagate style used across this crate.
    fn with_context(self, err: impl fmt::Display) -> Self {
        tracing::debug!(error = %err, "GPU request failed");
        self
    }
}
