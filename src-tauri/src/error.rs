//! Central error types for the overlay.
//!
//! Errors fall into two families:
//! - initialization errors, fatal to the subsystem that raised them (the
//!   subsystem stays inert, nothing else is affected)
//! - command dispatch errors, surfaced to the caller and logged; the next
//!   settle event retries naturally
//!
//! All errors implement `Serialize` for Tauri IPC compatibility.

use serde::Serialize;
use thiserror::Error;

/// Main error type for overlay operations.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// The host layout has no proxy region to track
    #[error("Proxy region not found")]
    MissingProxyRegion,

    /// A proxy region is already being tracked
    #[error("Proxy region '{id}' is already attached")]
    AlreadyAttached { id: String },

    /// Layout reports arrived before any region was attached
    #[error("No proxy region attached")]
    NotAttached,

    /// No compatible GPU adapter
    #[error("No GPU adapter found: {0}")]
    NoAdapter(String),

    /// Device or pipeline creation failed
    #[error("GPU device error: {0}")]
    DeviceError(String),

    /// wgpu surface creation/configuration failed
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Drawable acquisition failed for a single frame
    #[error("Failed to acquire drawable: {0}")]
    AcquireError(String),

    /// `create` issued twice for the same label
    #[error("Overlay surface '{label}' already exists")]
    DuplicateSurface { label: String },

    /// Command issued for a label that was never created
    #[error("Overlay surface '{label}' not found")]
    UnknownSurface { label: String },

    /// Window management error
    #[error("Window error: {0}")]
    WindowError(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl OverlayError {
    /// True for errors that leave the raising subsystem inert.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            OverlayError::MissingProxyRegion
                | OverlayError::AlreadyAttached { .. }
                | OverlayError::NoAdapter(_)
                | OverlayError::DeviceError(_)
                | OverlayError::SurfaceError(_)
                | OverlayError::DuplicateSurface { .. }
        )
    }
}

/// Implement Serialize for Tauri IPC compatibility.
/// Tauri requires errors to be serializable to send to the frontend.
impl Serialize for OverlayError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<tauri::Error> for OverlayError {
    fn from(err: tauri::Error) -> Self {
        OverlayError::WindowError(err.to_string())
    }
}

impl From<wgpu::RequestAdapterError> for OverlayError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        OverlayError::NoAdapter(err.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for OverlayError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        OverlayError::DeviceError(err.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for OverlayError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        OverlayError::SurfaceError(err.to_string())
    }
}

impl From<String> for OverlayError {
    fn from(msg: String) -> Self {
        OverlayError::Other(msg)
    }
}

impl From<&str> for OverlayError {
    fn from(msg: &str) -> Self {
        OverlayError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to OverlayError::Other.
    fn context(self, msg: &str) -> OverlayResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> OverlayResult<T> {
        self.map_err(|e| OverlayError::Other(format!("{}: {}", msg, e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to OverlayError::Other with the given message.
    fn context(self, msg: &str) -> OverlayResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> OverlayResult<T> {
        self.ok_or_else(|| OverlayError::Other(msg.to_string()))
    }
}

/// Type alias for Results using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::UnknownSurface {
            label: "wgpu1".to_string(),
        };
        assert_eq!(err.to_string(), "Overlay surface 'wgpu1' not found");
    }

    #[test]
    fn test_error_serialization() {
        let err = OverlayError::MissingProxyRegion;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Proxy region not found\"");
    }

    #[test]
    fn test_initialization_classification() {
        assert!(OverlayError::MissingProxyRegion.is_initialization());
        assert!(OverlayError::NoAdapter("none".into()).is_initialization());
        assert!(OverlayError::DuplicateSurface {
            label: "wgpu1".into()
        }
        .is_initialization());

        assert!(!OverlayError::UnknownSurface {
            label: "wgpu1".into()
        }
        .is_initialization());
        assert!(!OverlayError::WindowError("gone".into()).is_initialization());
        assert!(!OverlayError::NotAttached.is_initialization());
    }

    #[test]
    fn test_from_string() {
        let err: OverlayError = "test error".into();
        assert!(matches!(err, OverlayError::Other(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let msg = result.context("operation failed").unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_option_ext_context() {
        let opt: Option<i32> = None;
        let result = opt.context("main window missing");
        assert!(result.unwrap_err().to_string().contains("main window missing"));

        assert_eq!(Some(7).context("unused").unwrap(), 7);
    }
}
