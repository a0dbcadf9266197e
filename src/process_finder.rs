//! Process discovery.
//!
//! Joins the `sysinfo` process table with the window manager's view of
//! which process owns which main window.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::Arc;
use sysinfo::{ProcessesToUpdate, System};

use crate::error::{GopherError, Result};
use crate::platform::{MainWindow, WindowControl};

/// One live process at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// Executable name without the `.exe` suffix.
    pub name: String,
    pub main_window: Option<MainWindow>,
}

/// Point-in-time list of live processes.
///
/// The outer `Result` fails only when nothing could be listed. Inner errors
/// describe single processes that could not be read; callers skip them.
pub trait ProcessSource: Send {
    fn processes(&mut self) -> Result<Vec<Result<ProcessRecord>>>;
}

/// `sysinfo`-backed [`ProcessSource`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use window_gopher::platform::NativeControl;
/// use window_gopher::process_finder::{ProcessFinder, ProcessSource};
///
/// let mut finder = ProcessFinder::new(Arc::new(NativeControl::new()));
/// for record in finder.processes().unwrap().into_iter().flatten() {
///     if let Some(window) = record.main_window {
///         println!("{} ({}): {}", record.name, record.pid, window.title);
///     }
/// }
/// ```
pub struct ProcessFinder {
    system: System,
    control: Arc<dyn WindowControl>,
}

impl ProcessFinder {
    pub fn new(control: Arc<dyn WindowControl>) -> Self {
        Self {
            system: System::new(),
            control,
        }
    }
}

impl ProcessSource for ProcessFinder {
    fn processes(&mut self) -> Result<Vec<Result<ProcessRecord>>> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        let mut windows: HashMap<u32, MainWindow> = self.control.main_windows()?;

        let mut records: Vec<Result<ProcessRecord>> = self
            .system
            .processes()
            .iter()
            .map(|(pid, process)| {
                let pid = pid.as_u32();
                Ok(ProcessRecord {
                    pid,
                    name: display_process_name(process.name()),
                    main_window: windows.remove(&pid),
                })
            })
            .collect();

        // Windows whose process was not in the table: started or exited
        // between the two queries.
        records.extend(windows.into_keys().map(|pid| {
            Err(GopherError::enumeration(format!(
                "process {pid} changed during the scan"
            )))
        }));

        Ok(records)
    }
}

/// Process name as shown to the user: the executable name without `.exe`.
pub fn display_process_name(raw: &OsStr) -> String {
    let name = raw.to_string_lossy();
    match name.len().checked_sub(4) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".exe") => {
            name[..cut].to_string()
        }
        _ => name.into_owned(),
    }
}
