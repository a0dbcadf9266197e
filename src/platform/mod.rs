//! The slice of the OS window manager this crate talks to.
//!
//! [`WindowControl`] is the seam between the focus logic and the desktop.
//! The Win32 implementation lives in `win32`; other hosts get an
//! implementation that finds no windows and refuses every mutation.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
pub use win32::Win32Control as NativeControl;

#[cfg(not(windows))]
mod unsupported;
#[cfg(not(windows))]
pub use unsupported::UnsupportedControl as NativeControl;

/// Opaque top-level window identifier.
///
/// Stored as a plain integer so it can cross task boundaries. It may go stale
/// at any time; check [`WindowControl::is_window`] before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub const fn new(raw: isize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> isize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// OS thread identifier, as used for input attachment.
pub type ThreadId = u32;

/// A process's main window as seen by the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainWindow {
    pub handle: WindowHandle,
    pub title: String,
}

/// Window operations needed to discover windows and force one to the front.
///
/// Implementations must be callable from the event loop thread; the focus
/// code never calls them from anywhere else.
pub trait WindowControl: Send + Sync {
    /// Main window of every process that has one, keyed by process id.
    fn main_windows(&self) -> Result<HashMap<u32, MainWindow>>;

    /// Whether the handle still names a live window.
    fn is_window(&self, handle: WindowHandle) -> bool;

    /// Whether the window is minimized.
    fn is_iconic(&self, handle: WindowHandle) -> bool;

    /// Restore a minimized window to its normal placement.
    fn restore(&self, handle: WindowHandle) -> Result<()>;

    /// Move the window in or out of the always-on-top band without moving or
    /// resizing it.
    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> Result<()>;

    /// Ask the OS to make this the foreground window.
    fn set_foreground(&self, handle: WindowHandle) -> Result<()>;

    /// Plain show call.
    fn show(&self, handle: WindowHandle) -> Result<()>;

    /// Thread owning the window's message queue, if the window still exists.
    fn window_thread_id(&self, handle: WindowHandle) -> Option<ThreadId>;

    /// Thread id of the caller.
    fn current_thread_id(&self) -> ThreadId;

    /// Merge (or split) the input queues of `from` and `to`.
    fn attach_thread_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod fake;
