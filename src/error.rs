//! Custom error types for window-gopher.
//!
//! This module provides structured error types using `thiserror` for the
//! registry, the oscillator and the Win32 interop layer.

use std::io;
use thiserror::Error;

use crate::platform::WindowHandle;

/// Main error type for window-gopher operations.
#[derive(Error, Debug)]
pub enum GopherError {
    /// A label is not present in the current registry snapshot.
    #[error("window '{label}' is not in the current window list")]
    LabelNotFound { label: String },

    /// Current and target selections point at the same window.
    #[error("current and target windows must be different (both are '{label}')")]
    SameWindow { label: String },

    /// Start was requested while a cycle is already running.
    #[error("the focus cycle is already running")]
    AlreadyRunning,

    /// The handle no longer refers to a live window.
    #[error("window {handle} no longer exists")]
    StaleWindow { handle: WindowHandle },

    /// A Win32 call reported failure.
    #[error("{call} failed with error code {code}")]
    Win32 { call: &'static str, code: u32 },

    /// Listing processes or windows failed as a whole.
    #[error("window enumeration failed: {0}")]
    Enumeration(String),

    /// Error registering or handling the toggle hotkey.
    #[error("hotkey error: {0}")]
    Hotkey(String),

    /// Platform-specific operation is not supported.
    #[error("operation not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for window-gopher operations.
pub type Result<T> = std::result::Result<T, GopherError>;

impl GopherError {
    /// Create a new LabelNotFound error.
    pub fn label_not_found(label: impl Into<String>) -> Self {
        Self::LabelNotFound {
            label: label.into(),
        }
    }

    /// Create a new SameWindow error.
    pub fn same_window(label: impl Into<String>) -> Self {
        Self::SameWindow {
            label: label.into(),
        }
    }

    /// Create a new StaleWindow error.
    pub fn stale_window(handle: WindowHandle) -> Self {
        Self::StaleWindow { handle }
    }

    /// Create a new Win32 error.
    pub fn win32(call: &'static str, code: u32) -> Self {
        Self::Win32 { call, code }
    }

    /// Create a new Enumeration error.
    pub fn enumeration(message: impl Into<String>) -> Self {
        Self::Enumeration(message.into())
    }

    /// Create a new Hotkey error.
    pub fn hotkey(message: impl Into<String>) -> Self {
        Self::Hotkey(message.into())
    }

    /// Create a new UnsupportedPlatform error.
    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(message.into())
    }

    /// Whether the user can fix this by changing their selection.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::LabelNotFound { .. } | Self::SameWindow { .. } | Self::AlreadyRunning
        )
    }
}
