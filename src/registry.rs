//! Window registry.
//!
//! Every scan builds a complete [`Snapshot`] from scratch and swaps it in
//! with a single `watch` publication. Readers hold an `Arc<Snapshot>` and
//! never see a half-built mapping, no matter which thread scans.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::Result;
use crate::platform::WindowHandle;
use crate::process_finder::{ProcessRecord, ProcessSource};

/// One discoverable top-level window at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowEntry {
    pub label: String,
    pub handle: WindowHandle,
    pub process_id: u32,
}

impl WindowEntry {
    /// Returns `None` for processes without a main window.
    pub fn from_record(record: ProcessRecord) -> Option<Self> {
        let window = record.main_window?;
        if window.handle.is_null() {
            return None;
        }

        Some(Self {
            label: window_label(&window.title, &record.name, record.pid),
            handle: window.handle,
            process_id: record.pid,
        })
    }
}

/// `"{title} - {name} (PID {pid})"`, or `[No Title]` in place of a blank title.
///
/// The pid keeps labels unique even for identical titles.
pub fn window_label(title: &str, process_name: &str, pid: u32) -> String {
    let title = title.trim();
    if title.is_empty() {
        format!("[No Title] - {process_name} (PID {pid})")
    } else {
        format!("{title} - {process_name} (PID {pid})")
    }
}

/// Immutable result of one scan, ordered by label.
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    generation: u64,
    entries: BTreeMap<String, WindowEntry>,
}

impl Snapshot {
    /// Build a snapshot, skipping records that could not be read.
    pub fn from_records<I>(generation: u64, records: I) -> Self
    where
        I: IntoIterator<Item = Result<ProcessRecord>>,
    {
        let mut entries = BTreeMap::new();
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!(event = "registry.entry_skipped", error = %err);
                    continue;
                }
            };

            if let Some(entry) = WindowEntry::from_record(record) {
                entries.insert(entry.label.clone(), entry);
            }
        }

        Self {
            generation,
            entries,
        }
    }

    /// Scan counter; 0 is the empty snapshot before the first scan.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &WindowEntry> {
        self.entries.values()
    }

    /// Exact label lookup.
    pub fn resolve(&self, label: &str) -> Option<&WindowEntry> {
        self.entries.get(label)
    }

    /// Lenient lookup for typed input: exact label, then process id, then a
    /// case-insensitive substring that matches exactly one label.
    pub fn find(&self, query: &str) -> Option<&WindowEntry> {
        if let Some(entry) = self.resolve(query) {
            return Some(entry);
        }

        let query = query.trim();
        if let Ok(pid) = query.parse::<u32>() {
            if let Some(entry) = self.entries().find(|entry| entry.process_id == pid) {
                return Some(entry);
            }
        }

        let needle = query.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut matches = self
            .entries()
            .filter(|entry| entry.label.to_lowercase().contains(&needle));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }
}

/// Owns the process source and publishes a fresh [`Snapshot`] per scan.
pub struct WindowRegistry<S> {
    source: S,
    generation: u64,
    publisher: watch::Sender<Arc<Snapshot>>,
}

impl<S: ProcessSource> WindowRegistry<S> {
    pub fn new(source: S) -> Self {
        let (publisher, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            source,
            generation: 0,
            publisher,
        }
    }

    /// Rebuild the mapping and publish it.
    ///
    /// If the process list cannot be read at all, the previous snapshot stays
    /// in place and the error is returned.
    pub fn scan(&mut self) -> Result<Arc<Snapshot>> {
        let records = self.source.processes()?;

        self.generation += 1;
        let snapshot = Arc::new(Snapshot::from_records(self.generation, records));
        debug!(
            event = "registry.scan_completed",
            generation = snapshot.generation(),
            windows = snapshot.len()
        );

        self.publisher.send_replace(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.publisher.borrow())
    }

    pub fn resolve(&self, label: &str) -> Option<WindowEntry> {
        self.publisher.borrow().resolve(label).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.publisher.subscribe()
    }

    /// Rescan every `period` until every subscriber is gone.
    pub async fn run(mut self, period: Duration) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.publisher.is_closed() {
                debug!(event = "registry.stopped");
                break;
            }
            if let Err(err) = self.scan() {
                warn!(event = "registry.scan_failed", error = %err);
            }
        }
    }
}

impl<S: ProcessSource + 'static> WindowRegistry<S> {
    /// Scan once now, then keep scanning on a background task.
    ///
    /// Returns a receiver that always holds the latest snapshot.
    pub fn spawn(mut self, period: Duration) -> (watch::Receiver<Arc<Snapshot>>, JoinHandle<()>) {
        if let Err(err) = self.scan() {
            warn!(event = "registry.scan_failed", error = %err);
        }
        let receiver = self.subscribe();
        let task = tokio::spawn(self.run(period));
        (receiver, task)
    }
}
