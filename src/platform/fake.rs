//! In-memory desktop for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use super::{MainWindow, ThreadId, WindowControl, WindowHandle};
use crate::error::{GopherError, Result};

pub(crate) const CALLER_THREAD: ThreadId = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Attach { from: ThreadId, to: ThreadId },
    Detach { from: ThreadId, to: ThreadId },
    Restore(WindowHandle),
    Topmost(WindowHandle, bool),
    Foreground(WindowHandle),
    Show(WindowHandle),
}

#[derive(Default)]
struct State {
    windows: HashMap<u32, MainWindow>,
    threads: HashMap<WindowHandle, ThreadId>,
    iconic: HashSet<WindowHandle>,
    fail_topmost: bool,
    fail_foreground: bool,
    fail_listing: bool,
    calls: Vec<(Instant, Call)>,
}

#[derive(Default)]
pub(crate) struct FakeDesktop {
    state: Mutex<State>,
}

impl FakeDesktop {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call) {
        self.state().calls.push((Instant::now(), call));
    }

    /// Open a window owned by `pid`, pumped by thread `thread`.
    pub(crate) fn open(&self, pid: u32, raw: isize, title: &str, thread: ThreadId) -> WindowHandle {
        let handle = WindowHandle::new(raw);
        let mut state = self.state();
        state.windows.insert(
            pid,
            MainWindow {
                handle,
                title: title.to_string(),
            },
        );
        state.threads.insert(handle, thread);
        handle
    }

    pub(crate) fn close(&self, handle: WindowHandle) {
        let mut state = self.state();
        state.windows.retain(|_, window| window.handle != handle);
        state.threads.remove(&handle);
    }

    pub(crate) fn minimize(&self, handle: WindowHandle) {
        self.state().iconic.insert(handle);
    }

    pub(crate) fn fail_topmost(&self, fail: bool) {
        self.state().fail_topmost = fail;
    }

    pub(crate) fn fail_foreground(&self, fail: bool) {
        self.state().fail_foreground = fail;
    }

    pub(crate) fn fail_listing(&self, fail: bool) {
        self.state().fail_listing = fail;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.iter().map(|(_, call)| *call).collect()
    }

    /// Every foreground request with the (paused-clock) time it was made.
    pub(crate) fn foregrounds(&self) -> Vec<(Instant, WindowHandle)> {
        self.state()
            .calls
            .iter()
            .filter_map(|(at, call)| match call {
                Call::Foreground(handle) => Some((*at, *handle)),
                _ => None,
            })
            .collect()
    }
}

impl WindowControl for FakeDesktop {
    fn main_windows(&self) -> Result<HashMap<u32, MainWindow>> {
        let state = self.state();
        if state.fail_listing {
            return Err(GopherError::enumeration("desktop unavailable"));
        }
        Ok(state.windows.clone())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.state().threads.contains_key(&handle)
    }

    fn is_iconic(&self, handle: WindowHandle) -> bool {
        self.state().iconic.contains(&handle)
    }

    fn restore(&self, handle: WindowHandle) -> Result<()> {
        self.record(Call::Restore(handle));
        self.state().iconic.remove(&handle);
        Ok(())
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> Result<()> {
        self.record(Call::Topmost(handle, topmost));
        if self.state().fail_topmost {
            return Err(GopherError::win32("SetWindowPos", 5));
        }
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> Result<()> {
        self.record(Call::Foreground(handle));
        if self.state().fail_foreground {
            return Err(GopherError::win32("SetForegroundWindow", 0));
        }
        Ok(())
    }

    fn show(&self, handle: WindowHandle) -> Result<()> {
        self.record(Call::Show(handle));
        Ok(())
    }

    fn window_thread_id(&self, handle: WindowHandle) -> Option<ThreadId> {
        self.state().threads.get(&handle).copied()
    }

    fn current_thread_id(&self) -> ThreadId {
        CALLER_THREAD
    }

    fn attach_thread_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> Result<()> {
        let call = if attach {
            Call::Attach { from, to }
        } else {
            Call::Detach { from, to }
        };
        self.record(call);
        Ok(())
    }
}
