//! Error types for capture, delivery and settings operations
//!
//! This module defines the error types used across the pipeline. Each error
//! carries enough context to log a useful message and provides a
//! `remediation_hint()` with next steps for the user.
//!
//! Only [`CaptureError`] values are surfaced to callers of a trigger action.
//! [`DeliveryError`] values are absorbed by the delivery pipeline (logged and
//! converted into a degraded outcome), except when testing an FTP connection.

use std::path::PathBuf;

use crate::model::DisplayId;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result type alias for delivery steps
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Result type alias for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while resolving displays, acquiring frames or running a
/// selection session
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The requested display is not among the active displays
    #[error("Display {display_id} not found among active displays")]
    DisplayNotFound {
        /// Identifier that failed to match
        display_id: DisplayId,
    },

    /// The backend reported no displays at all
    #[error("No active displays available for capture")]
    NoDisplays,

    /// Display enumeration failed in the backend
    #[error("Failed to enumerate displays: {reason}")]
    DisplayEnumeration {
        /// Backend-provided reason
        reason: String,
    },

    /// The platform capture call failed
    #[error("Capture of display {display_id} failed: {reason}")]
    CaptureFailed {
        /// Display that was being captured
        display_id: DisplayId,
        /// Backend-provided reason
        reason:     String,
    },

    /// Capture operation timed out
    #[error("Capture operation timed out after {duration_ms}ms")]
    CaptureTimeout {
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason:    String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// A selection overlay is already open
    #[error("A region selection session is already in progress")]
    SelectorBusy,

    /// The selection overlay could not be opened or drawn
    #[error("Selection surface unavailable: {reason}")]
    SurfaceUnavailable {
        /// Reason reported by the surface
        reason: String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CaptureError {
    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use shotpipe::error::CaptureError;
    ///
    /// let error = CaptureError::DisplayNotFound { display_id: 7 };
    /// assert!(error.remediation_hint().contains("displays"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::DisplayNotFound { .. } => {
                "The display was disconnected or renumbered after the trigger fired. Run the \
                 `displays` command to list active displays and trigger the capture again."
            }
            CaptureError::NoDisplays => {
                "No displays were reported by the capture backend. Ensure a graphical session is \
                 running and the process can reach the display server."
            }
            CaptureError::DisplayEnumeration { .. } => {
                "Display enumeration failed. Check that the display server is reachable (DISPLAY or \
                 WAYLAND_DISPLAY is set) and that screen capture permission is granted."
            }
            CaptureError::CaptureFailed { .. } => {
                "The platform refused or failed the screen capture. Grant screen recording \
                 permission to the application and retry."
            }
            CaptureError::CaptureTimeout { .. } => {
                "The capture took too long. Close any pending permission dialogs and retry."
            }
            CaptureError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "region" => "The selection must lie inside the captured frame.",
                _ => "Check the parameter value and retry.",
            },
            CaptureError::EncodingFailed { .. } => {
                "PNG encoding failed. The captured image may be empty or corrupted; retry the \
                 capture."
            }
            CaptureError::ImageError(_) => {
                "Image processing failed. Ensure the image data is valid and the requested \
                 operations are supported."
            }
            CaptureError::SelectorBusy => {
                "Finish or cancel (Escape) the open selection overlay before starting another \
                 region capture."
            }
            CaptureError::SurfaceUnavailable { .. } => {
                "The selection overlay could not be shown. Use a fullscreen capture action instead."
            }
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
        }
    }
}

/// Errors raised by individual delivery steps
///
/// The delivery pipeline logs these and continues with the next step. They
/// only reach callers through
/// [`DeliveryPipeline::test_ftp_connection`](crate::delivery::DeliveryPipeline::test_ftp_connection).
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Writing the capture to the local save folder failed
    #[error("Failed to save capture to {}: {source}", path.display())]
    LocalSave {
        /// Target file path
        path:   PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The FTP server rejected the credentials
    #[error("FTP login to {host} failed: {reason}")]
    FtpAuth {
        /// FTP host
        host:   String,
        /// Server or client reason
        reason: String,
    },

    /// Connecting to or talking with the FTP server failed
    #[error("FTP transfer with {host} failed: {reason}")]
    FtpNetwork {
        /// FTP host
        host:   String,
        /// Server or client reason
        reason: String,
    },
}

impl DeliveryError {
    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> &str {
        match self {
            DeliveryError::LocalSave { source, .. } => match source.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    "The local save folder is not writable. Choose another folder in settings."
                }
                _ => "Check that the local save folder exists or can be created and has free space.",
            },
            DeliveryError::FtpAuth { .. } => {
                "Check the FTP username and password in settings and use `test-ftp` to verify them."
            }
            DeliveryError::FtpNetwork { .. } => {
                "Check the FTP host, port and TLS setting, and that the server is reachable from \
                 this machine."
            }
        }
    }
}

/// Errors raised while loading or saving the settings file
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("Failed to read settings from {}: {source}", path.display())]
    Read {
        /// Settings file path
        path:   PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid settings JSON
    #[error("Failed to parse settings in {}: {source}", path.display())]
    Parse {
        /// Settings file path
        path:   PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// The settings file could not be written
    #[error("Failed to write settings to {}: {source}", path.display())]
    Write {
        /// Settings file path
        path:   PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

impl SettingsError {
    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> &str {
        match self {
            SettingsError::Read { .. } => "Check the settings file permissions.",
            SettingsError::Parse { .. } => {
                "Fix the JSON syntax in the settings file or delete it to restore defaults."
            }
            SettingsError::Write { .. } => {
                "Check that the settings directory is writable and the disk is not full."
            }
        }
    }
}
