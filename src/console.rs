//! Interactive console.
//!
//! Plays the part of a window picker: it keeps a current/target selection
//! that survives rescans, holds the raw interval text, and turns typed
//! commands, hotkey presses and Ctrl-C into oscillator events. Everything
//! runs on the caller's event loop.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::config::{OscillatorConfig, DEFAULT_CYCLE_SECS, DEFAULT_DWELL_SECS};
use crate::error::Result;
use crate::oscillator::{Oscillator, Phase};
use crate::registry::{Snapshot, WindowEntry};

/// Current/target labels picked from a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub current: Option<String>,
    pub target: Option<String>,
}

impl Selection {
    /// Keep choices that are still listed; anything else falls back to the
    /// first listed window.
    pub fn reconcile(&mut self, snapshot: &Snapshot) {
        let first = snapshot.labels().next().map(str::to_string);
        for slot in [&mut self.current, &mut self.target] {
            let listed = slot
                .as_deref()
                .is_some_and(|label| snapshot.resolve(label).is_some());
            if !listed {
                slot.clone_from(&first);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Current(String),
    Target(String),
    Cycle(String),
    Dwell(String),
    Start,
    Stop,
    Toggle,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim().to_string()),
            None => (line, String::new()),
        };

        match word.to_lowercase().as_str() {
            "" => Self::Empty,
            "list" | "ls" => Self::List,
            "current" => Self::Current(rest),
            "target" => Self::Target(rest),
            "cycle" => Self::Cycle(rest),
            "dwell" => Self::Dwell(rest),
            "start" => Self::Start,
            "stop" => Self::Stop,
            "toggle" => Self::Toggle,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
commands:
  list                 show windows
  current <n|text>     window to return to (list number, pid or part of the label)
  target <n|text>      window to pull to the front
  cycle <seconds>      time between activations
  dwell <seconds>      time the target stays in front
  start | stop | toggle
  status
  quit";

pub struct Console<W> {
    snapshots: watch::Receiver<Arc<Snapshot>>,
    oscillator: Oscillator,
    selection: Selection,
    cycle_input: String,
    dwell_input: String,
    stop_requested: bool,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(snapshots: watch::Receiver<Arc<Snapshot>>, oscillator: Oscillator, out: W) -> Self {
        let mut console = Self {
            snapshots,
            oscillator,
            selection: Selection::default(),
            cycle_input: DEFAULT_CYCLE_SECS.to_string(),
            dwell_input: DEFAULT_DWELL_SECS.to_string(),
            stop_requested: false,
            out,
        };
        console.refresh_selection();
        console
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.oscillator.phase()
    }

    pub fn set_intervals(&mut self, cycle: impl Into<String>, dwell: impl Into<String>) {
        self.cycle_input = cycle.into();
        self.dwell_input = dwell.into();
    }

    /// Select both windows by lenient lookup (label, pid or unique substring).
    pub fn choose(&mut self, current: &str, target: &str) -> Result<()> {
        self.pick(current, true)?;
        self.pick(target, false)
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshots.borrow())
    }

    fn refresh_selection(&mut self) {
        let snapshot = self.snapshot();
        self.selection.reconcile(&snapshot);
    }

    fn lookup(snapshot: &Snapshot, query: &str) -> Option<WindowEntry> {
        if let Ok(number) = query.trim().parse::<usize>() {
            if let Some(entry) = number.checked_sub(1).and_then(|i| snapshot.entries().nth(i)) {
                return Some(entry.clone());
            }
        }
        snapshot.find(query).cloned()
    }

    fn pick(&mut self, query: &str, current: bool) -> Result<()> {
        let snapshot = self.snapshot();
        match Self::lookup(&snapshot, query) {
            Some(entry) => {
                let slot = if current {
                    &mut self.selection.current
                } else {
                    &mut self.selection.target
                };
                *slot = Some(entry.label);
                Ok(())
            }
            None => {
                writeln!(
                    self.out,
                    "{}",
                    format!("no single window matches '{query}'").red()
                )?;
                Ok(())
            }
        }
    }

    fn list(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            writeln!(self.out, "{}", "no windows found".yellow())?;
            return Ok(());
        }
        for (i, label) in snapshot.labels().enumerate() {
            let current = self.selection.current.as_deref() == Some(label);
            let target = self.selection.target.as_deref() == Some(label);
            let mark = match (current, target) {
                (true, true) => "C/T",
                (true, false) => "C",
                (false, true) => "T",
                (false, false) => "",
            };
            writeln!(self.out, "{:>3}. {:<3} {}", i + 1, mark.cyan(), label)?;
        }
        Ok(())
    }

    /// Validation problems are shown to the user, never returned.
    pub fn start(&mut self) -> Result<()> {
        let (Some(current), Some(target)) = (
            self.selection.current.clone(),
            self.selection.target.clone(),
        ) else {
            writeln!(
                self.out,
                "{}",
                "select both current and target windows first".red()
            )?;
            return Ok(());
        };

        let config = OscillatorConfig::from_inputs(&self.cycle_input, &self.dwell_input);
        let snapshot = self.snapshot();
        match self.oscillator.start(&snapshot, &current, &target, config) {
            Ok(_) => writeln!(
                self.out,
                "{} {} -> {} ({config})",
                "started:".green(),
                current,
                target
            )?,
            Err(err) => writeln!(self.out, "{}", err.to_string().red())?,
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if self.oscillator.stop() {
            self.stop_requested = true;
            writeln!(self.out, "{}", "stopped".yellow())?;
        }
        Ok(())
    }

    fn on_idle(&mut self) -> Result<()> {
        if std::mem::take(&mut self.stop_requested) {
            return Ok(());
        }
        debug!(event = "console.run_ended");
        writeln!(
            self.out,
            "{}",
            "a selected window closed; cycle stopped".yellow()
        )?;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<()> {
        match self.oscillator.phase() {
            Phase::Running => self.stop(),
            Phase::Idle => self.start(),
        }
    }

    fn status(&mut self) -> Result<()> {
        let line = match self.oscillator.active() {
            Some((pair, config)) => format!(
                "{} target {} / current {} ({config})",
                "Running".green().bold(),
                pair.target,
                pair.current
            ),
            None => format!("{}", "Idle".dimmed()),
        };
        writeln!(self.out, "{line}")?;
        writeln!(
            self.out,
            "  current: {}\n  target:  {}\n  cycle: {}s  dwell: {}s",
            self.selection.current.as_deref().unwrap_or("-"),
            self.selection.target.as_deref().unwrap_or("-"),
            self.cycle_input,
            self.dwell_input
        )?;
        Ok(())
    }

    pub fn handle(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::List => self.list()?,
            Command::Current(query) => self.pick(&query, true)?,
            Command::Target(query) => self.pick(&query, false)?,
            Command::Cycle(text) => self.cycle_input = text,
            Command::Dwell(text) => self.dwell_input = text,
            Command::Start => self.start()?,
            Command::Stop => self.stop()?,
            Command::Toggle => self.toggle()?,
            Command::Status => self.status()?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Empty => {}
            Command::Unknown(line) => {
                writeln!(self.out, "unknown command '{line}', try 'help'")?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Drive the console until quit, end of input or Ctrl-C.
    ///
    /// `input` carries typed lines (none in unattended mode); `toggles`
    /// carries hotkey presses. On exit any run is stopped and its pending
    /// restoration awaited.
    pub async fn run(
        &mut self,
        mut input: Option<mpsc::UnboundedReceiver<String>>,
        mut toggles: Option<mpsc::UnboundedReceiver<()>>,
    ) -> Result<()> {
        let mut snapshots = self.snapshots.clone();
        let mut registry_alive = true;
        let mut phase = self.oscillator.watch_phase();
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                line = next_event(&mut input) => match line {
                    Some(line) => {
                        if self.handle(Command::parse(&line))? == Flow::Quit {
                            break;
                        }
                    }
                    None => break,
                },
                press = next_event(&mut toggles) => match press {
                    Some(()) => self.toggle()?,
                    None => toggles = None,
                },
                changed = snapshots.changed(), if registry_alive => match changed {
                    Ok(()) => {
                        snapshots.borrow_and_update();
                        self.refresh_selection();
                    }
                    Err(_) => registry_alive = false,
                },
                changed = phase.changed() => {
                    if changed.is_ok() && *phase.borrow_and_update() == Phase::Idle {
                        self.on_idle()?;
                    }
                },
                _ = &mut ctrl_c => break,
            }
        }

        self.oscillator.shutdown().await;
        Ok(())
    }
}

/// Next item from an optional channel; pending forever when there is none.
async fn next_event<T>(receiver: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match receiver {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

/// Read stdin lines on a plain thread.
///
/// A blocking read parked inside the runtime would hold up shutdown.
pub fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<String>> {
    let (lines, receiver) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("gopher-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if lines.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(receiver)
}
