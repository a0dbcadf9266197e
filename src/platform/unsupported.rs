//! `WindowControl` for hosts without a Win32 desktop.

use std::collections::HashMap;

use super::{MainWindow, ThreadId, WindowControl, WindowHandle};
use crate::error::{GopherError, Result};

/// Stand-in for hosts without a Win32 desktop: no windows, no focus changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedControl;

impl UnsupportedControl {
    pub fn new() -> Self {
        Self
    }
}

fn unsupported(call: &str) -> GopherError {
    GopherError::unsupported_platform(format!("{call} requires a Windows desktop"))
}

impl WindowControl for UnsupportedControl {
    fn main_windows(&self) -> Result<HashMap<u32, MainWindow>> {
        Ok(HashMap::new())
    }

    fn is_window(&self, _handle: WindowHandle) -> bool {
        false
    }

    fn is_iconic(&self, _handle: WindowHandle) -> bool {
        false
    }

    fn restore(&self, _handle: WindowHandle) -> Result<()> {
        Err(unsupported("restore"))
    }

    fn set_topmost(&self, _handle: WindowHandle, _topmost: bool) -> Result<()> {
        Err(unsupported("set_topmost"))
    }

    fn set_foreground(&self, _handle: WindowHandle) -> Result<()> {
        Err(unsupported("set_foreground"))
    }

    fn show(&self, _handle: WindowHandle) -> Result<()> {
        Err(unsupported("show"))
    }

    fn window_thread_id(&self, _handle: WindowHandle) -> Option<ThreadId> {
        None
    }

    fn current_thread_id(&self) -> ThreadId {
        0
    }

    fn attach_thread_input(&self, _from: ThreadId, _to: ThreadId, _attach: bool) -> Result<()> {
        Err(unsupported("attach_thread_input"))
    }
}
