use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{self, Instant};

use window_gopher::config::{DEFAULT_CYCLE_SECS, DEFAULT_DWELL_SECS};
use window_gopher::platform::{MainWindow, ThreadId};
use window_gopher::process_finder::ProcessRecord;
use window_gopher::{
    force_to_front, GopherError, Oscillator, OscillatorConfig, Phase, ProcessSource, Result,
    WindowControl, WindowHandle, WindowRegistry,
};

// A tiny desktop: windows, their threads, and a log of focus calls.

#[derive(Default)]
struct Desktop {
    threads: Mutex<HashMap<WindowHandle, ThreadId>>,
    minimized: Mutex<HashSet<WindowHandle>>,
    fail_zorder: Mutex<bool>,
    log: Mutex<Vec<(Instant, String)>>,
}

impl Desktop {
    fn add(&self, raw: isize, thread: ThreadId) -> WindowHandle {
        let handle = WindowHandle::new(raw);
        self.threads.lock().unwrap().insert(handle, thread);
        handle
    }

    fn note(&self, entry: String) {
        self.log.lock().unwrap().push((Instant::now(), entry));
    }

    fn entries(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    fn focus_times(&self) -> Vec<(Duration, String)> {
        let log = self.log.lock().unwrap();
        let Some((start, _)) = log.first() else {
            return Vec::new();
        };
        let start = *start;
        log.iter()
            .filter(|(_, entry)| entry.starts_with("foreground"))
            .map(|(at, entry)| (*at - start, entry.clone()))
            .collect()
    }
}

impl WindowControl for Desktop {
    fn main_windows(&self) -> Result<HashMap<u32, MainWindow>> {
        Ok(HashMap::new())
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.threads.lock().unwrap().contains_key(&handle)
    }

    fn is_iconic(&self, handle: WindowHandle) -> bool {
        self.minimized.lock().unwrap().contains(&handle)
    }

    fn restore(&self, handle: WindowHandle) -> Result<()> {
        self.note(format!("restore {handle}"));
        Ok(())
    }

    fn set_topmost(&self, handle: WindowHandle, topmost: bool) -> Result<()> {
        self.note(format!("topmost {handle} {topmost}"));
        if *self.fail_zorder.lock().unwrap() {
            return Err(GopherError::win32("SetWindowPos", 1400));
        }
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> Result<()> {
        self.note(format!("foreground {handle}"));
        Ok(())
    }

    fn show(&self, handle: WindowHandle) -> Result<()> {
        self.note(format!("show {handle}"));
        Ok(())
    }

    fn window_thread_id(&self, handle: WindowHandle) -> Option<ThreadId> {
        self.threads.lock().unwrap().get(&handle).copied()
    }

    fn current_thread_id(&self) -> ThreadId {
        1
    }

    fn attach_thread_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> Result<()> {
        let verb = if attach { "attach" } else { "detach" };
        self.note(format!("{verb} {from}->{to}"));
        Ok(())
    }
}

// Process list that the test can swap between scans.

#[derive(Clone, Default)]
struct Processes(Arc<Mutex<Vec<ProcessRecord>>>);

impl Processes {
    fn set(&self, records: Vec<ProcessRecord>) {
        *self.0.lock().unwrap() = records;
    }
}

impl ProcessSource for Processes {
    fn processes(&mut self) -> Result<Vec<Result<ProcessRecord>>> {
        Ok(self.0.lock().unwrap().iter().cloned().map(Ok).collect())
    }
}

fn process(pid: u32, name: &str, window: Option<(isize, &str)>) -> ProcessRecord {
    ProcessRecord {
        pid,
        name: name.to_string(),
        main_window: window.map(|(raw, title)| MainWindow {
            handle: WindowHandle::new(raw),
            title: title.to_string(),
        }),
    }
}

#[test]
fn test_scan_without_windows_is_empty() {
    let processes = Processes::default();
    processes.set(vec![process(4, "System", None), process(88, "svchost", None)]);
    let mut registry = WindowRegistry::new(processes);

    let snapshot = registry.scan().unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(snapshot.labels().count(), 0);
}

#[test]
fn test_scan_labels_are_unique_and_resolvable() {
    let processes = Processes::default();
    processes.set(vec![
        process(10, "chrome", Some((0x10, "Inbox"))),
        process(11, "chrome", Some((0x11, "Inbox"))),
        process(12, "explorer", Some((0x12, ""))),
        process(13, "svchost", None),
    ]);
    let mut registry = WindowRegistry::new(processes.clone());

    let snapshot = registry.scan().unwrap();
    let labels: HashSet<&str> = snapshot.labels().collect();

    assert_eq!(labels.len(), 3);
    assert!(labels.contains("Inbox - chrome (PID 10)"));
    assert!(labels.contains("Inbox - chrome (PID 11)"));
    assert!(labels.contains("[No Title] - explorer (PID 12)"));

    let entry = registry.resolve("Inbox - chrome (PID 11)").unwrap();
    assert_eq!(entry.handle, WindowHandle::new(0x11));
    assert_eq!(entry.process_id, 11);

    processes.set(vec![process(10, "chrome", Some((0x10, "Inbox")))]);
    registry.scan().unwrap();
    assert!(registry.resolve("Inbox - chrome (PID 11)").is_none());
    // The earlier snapshot is untouched by the rescan.
    assert!(snapshot.resolve("Inbox - chrome (PID 11)").is_some());
}

#[test]
fn test_snapshot_json_listing() {
    let processes = Processes::default();
    processes.set(vec![process(10, "notepad", Some((0x2a, "Notes")))]);
    let mut registry = WindowRegistry::new(processes);

    let snapshot = registry.scan().unwrap();
    let entries: Vec<_> = snapshot.entries().collect();
    let json = serde_json::to_value(&entries).unwrap();

    assert_eq!(json[0]["label"], "Notes - notepad (PID 10)");
    assert_eq!(json[0]["handle"], 42);
    assert_eq!(json[0]["process_id"], 10);
}

#[test]
fn test_force_to_front_detaches_after_zorder_failure() {
    let desktop = Desktop::default();
    let window = desktop.add(0x50, 9);
    desktop.minimized.lock().unwrap().insert(window);
    *desktop.fail_zorder.lock().unwrap() = true;

    let result = force_to_front(&desktop, window);

    assert!(matches!(result, Err(GopherError::Win32 { code: 1400, .. })));
    assert_eq!(
        desktop.entries(),
        vec![
            "attach 1->9",
            "restore 0x50",
            "topmost 0x50 true",
            "topmost 0x50 false",
            "foreground 0x50",
            "show 0x50",
            "detach 1->9",
        ]
    );
}

#[test]
fn test_interval_fallbacks() {
    let config = OscillatorConfig::from_inputs("abc", "xyz");
    assert_eq!(config.cycle(), Duration::from_secs(DEFAULT_CYCLE_SECS));
    assert_eq!(config.dwell(), Duration::from_secs(DEFAULT_DWELL_SECS));

    let config = OscillatorConfig::from_inputs("5", "2");
    assert_eq!(config.cycle(), Duration::from_secs(5));
    assert_eq!(config.dwell(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_registry_to_oscillator_cycle() {
    let desktop = Arc::new(Desktop::default());
    let editor = desktop.add(0x100, 7);
    let game = desktop.add(0x200, 8);

    let processes = Processes::default();
    processes.set(vec![
        process(70, "editor", Some((0x100, "Draft"))),
        process(80, "game", Some((0x200, "Idle Game"))),
    ]);
    let mut registry = WindowRegistry::new(processes);
    let snapshot = registry.scan().unwrap();

    let mut oscillator = Oscillator::new(desktop.clone());
    let config = OscillatorConfig::from_inputs("5", "2");
    oscillator
        .start(
            &snapshot,
            "Draft - editor (PID 70)",
            "Idle Game - game (PID 80)",
            config,
        )
        .unwrap();
    assert_eq!(oscillator.phase(), Phase::Running);

    time::sleep(Duration::from_secs(11)).await;
    oscillator.shutdown().await;

    let times = desktop.focus_times();
    let expected = [
        (Duration::from_secs(0), format!("foreground {game}")),
        (Duration::from_secs(2), format!("foreground {editor}")),
        (Duration::from_secs(5), format!("foreground {game}")),
        (Duration::from_secs(7), format!("foreground {editor}")),
    ];
    assert_eq!(times.len(), expected.len());
    for ((at, entry), (want_at, want_entry)) in times.iter().zip(expected.iter()) {
        assert_eq!(entry, want_entry);
        let skew = if *at > *want_at {
            *at - *want_at
        } else {
            *want_at - *at
        };
        assert!(skew <= Duration::from_millis(10), "{entry} off by {skew:?}");
    }
    assert_eq!(oscillator.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_with_same_label_does_not_run() {
    let desktop = Arc::new(Desktop::default());
    desktop.add(0x100, 7);

    let processes = Processes::default();
    processes.set(vec![process(70, "editor", Some((0x100, "Draft")))]);
    let mut registry = WindowRegistry::new(processes);
    let snapshot = registry.scan().unwrap();

    let mut oscillator = Oscillator::new(desktop.clone());
    let label = "Draft - editor (PID 70)";
    let result = oscillator.start(&snapshot, label, label, OscillatorConfig::default());

    assert!(matches!(result, Err(GopherError::SameWindow { .. })));
    assert!(result.unwrap_err().is_validation());
    time::sleep(Duration::from_secs(60)).await;
    assert!(desktop.entries().is_empty());
    assert!(!oscillator.stop());
}

#[test]
fn test_error_types() {
    let err = GopherError::label_not_found("Draft - editor (PID 70)");
    assert!(err.to_string().contains("PID 70"));

    let err = GopherError::same_window("x");
    assert!(err.to_string().contains("must be different"));

    let err = GopherError::win32("AttachThreadInput", 87);
    assert!(err.to_string().contains("AttachThreadInput"));
    assert!(err.to_string().contains("87"));
}
