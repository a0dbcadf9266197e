//! `WindowControl` on top of user32.

use std::collections::HashMap;
use std::ptr;

use winapi::shared::minwindef::{BOOL, DWORD, LPARAM, TRUE};
use winapi::shared::windef::HWND;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::processthreadsapi::GetCurrentThreadId;
use winapi::um::winuser::{
    AttachThreadInput, EnumWindows, GetWindow, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsIconic, IsWindow, IsWindowVisible, SetForegroundWindow,
    SetWindowPos, ShowWindow, GW_OWNER, HWND_NOTOPMOST, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE,
    SWP_SHOWWINDOW, SW_RESTORE, SW_SHOW,
};

use super::{MainWindow, ThreadId, WindowControl, WindowHandle};
use crate::error::{GopherError, Result};

/// Stateless handle to the real desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Control;

impl Win32Control {
    pub fn new() -> Self {
        Self
    }
}

fn hwnd(handle: WindowHandle) -> HWND {
    handle.raw() as HWND
}

fn last_error(call: &'static str) -> GopherError {
    GopherError::win32(call, unsafe { GetLastError() })
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam as *mut Vec<HWND>);
    windows.push(hwnd);
    TRUE
}

fn window_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u16; len as usize + 1];
    let copied = unsafe { GetWindowTextW(hwnd, buf.as_mut_ptr(), buf.len() as i32) };
    String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}

/// The window the shell would treat as a process's main window: visible and
/// not owned by another top-level window.
fn is_main_window(hwnd: HWND) -> bool {
    unsafe { IsWindowVisible(hwnd) != 0 && GetWindow(hwnd, GW_OWNER).is_null() }
}

impl WindowControl for Win32Control {
    fn main_windows(&self) -> Result<HashMap<u32, MainWindow>> {
        let mut handles: Vec<HWND> = Vec::new();
        let ok = unsafe {
            EnumWindows(
                Some(collect_window),
                &mut handles as *mut Vec<HWND> as LPARAM,
            )
        };
        if ok == 0 {
            return Err(last_error("EnumWindows"));
        }

        // Enumeration order is Z-order, so the first hit per process wins.
        let mut windows = HashMap::new();
        for hwnd in handles {
            if !is_main_window(hwnd) {
                continue;
            }

            let mut pid: DWORD = 0;
            let thread = unsafe { GetWindowThreadProcessId(hwnd, &mut pid) };
            if thread == 0 || pid == 0 {
                // Closed between enumeration and now.
                continue;
            }

            windows.entry(pid).or_insert_with(|| MainWindow {
                handle: WindowHandle::new(hwnd as isize),
                title: window_title(hwnd),
            });
        }

        Ok(windows)
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        !handle.is_null() && unsafe { IsWindow(hwnd(handle)) != 0 }
    }

    fn is_iconic(&self, handle: WindowHandle) -> bool {
        unsafe { IsIconic(hwnd(handle)) != 0 }
    }

    fn restore(&self, handle: WindowHandle) -> Result<()> {
        // ShowWindow reports previous visibility, not success.
        unsafe { ShowWindow(hwnd(handle), SW_RESTORE) };
        Ok(())
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> Result<()> {
        let insert_after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        let ok = unsafe {
            SetWindowPos(
                hwnd(handle),
                insert_after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_SHOWWINDOW,
            )
        };
        if ok == 0 {
            return Err(last_error("SetWindowPos"));
        }
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> Result<()> {
        if unsafe { SetForegroundWindow(hwnd(handle)) } == 0 {
            return Err(last_error("SetForegroundWindow"));
        }
        Ok(())
    }

    fn show(&self, handle: WindowHandle) -> Result<()> {
        unsafe { ShowWindow(hwnd(handle), SW_SHOW) };
        Ok(())
    }

    fn window_thread_id(&self, handle: WindowHandle) -> Option<ThreadId> {
        let thread = unsafe { GetWindowThreadProcessId(hwnd(handle), ptr::null_mut()) };
        (thread != 0).then_some(thread)
    }

    fn current_thread_id(&self) -> ThreadId {
        unsafe { GetCurrentThreadId() }
    }

    fn attach_thread_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> Result<()> {
        if unsafe { AttachThreadInput(from, to, attach as BOOL) } == 0 {
            return Err(last_error("AttachThreadInput"));
        }
        Ok(())
    }
}
