//! Focus oscillator.
//!
//! Two phases, three events. `start` resolves two labels against a registry
//! snapshot once and spawns the cycle task; from then on only the two raw
//! handles are used. Each cycle tick forces the target to the front, waits
//! out the dwell without blocking the event loop, then hands focus back to
//! the current window.
//!
//! `stop` cancels all future ticks at once. A restoration that is already
//! waiting out its dwell still runs, so the user always gets their window
//! back.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::OscillatorConfig;
use crate::error::{GopherError, Result};
use crate::foreground::force_to_front;
use crate::platform::{WindowControl, WindowHandle};
use crate::registry::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Handles captured at start. Never re-resolved during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    /// Window focus returns to after each dwell.
    pub current: WindowHandle,
    /// Window periodically pulled to the front.
    pub target: WindowHandle,
}

struct Run {
    pair: WindowPair,
    config: OscillatorConfig,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct Oscillator {
    control: Arc<dyn WindowControl>,
    phase: Arc<watch::Sender<Phase>>,
    run: Option<Run>,
    draining: Vec<JoinHandle<()>>,
}

impl Oscillator {
    pub fn new(control: Arc<dyn WindowControl>) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            control,
            phase: Arc::new(phase),
            run: None,
            draining: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Follows every phase change, including a run ending on its own.
    pub fn watch_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Handles and intervals of the active run.
    pub fn active(&self) -> Option<(WindowPair, OscillatorConfig)> {
        if self.phase() != Phase::Running {
            return None;
        }
        self.run.as_ref().map(|run| (run.pair, run.config))
    }

    /// Idle -> Running.
    ///
    /// Fails without changing anything if already running, if both labels are
    /// the same, or if either label is missing from `snapshot`.
    pub fn start(
        &mut self,
        snapshot: &Snapshot,
        current_label: &str,
        target_label: &str,
        config: OscillatorConfig,
    ) -> Result<WindowPair> {
        if self.phase() == Phase::Running {
            return Err(GopherError::AlreadyRunning);
        }
        if current_label == target_label {
            return Err(GopherError::same_window(current_label));
        }

        let current = snapshot
            .resolve(current_label)
            .ok_or_else(|| GopherError::label_not_found(current_label))?;
        let target = snapshot
            .resolve(target_label)
            .ok_or_else(|| GopherError::label_not_found(target_label))?;
        let pair = WindowPair {
            current: current.handle,
            target: target.handle,
        };

        if config.overlaps() {
            warn!(
                event = "oscillator.dwell_overlaps_cycle",
                cycle_secs = config.cycle().as_secs(),
                dwell_secs = config.dwell().as_secs()
            );
        }

        // A run that ended on its own leaves its (finished) task behind.
        self.run = None;

        let (stop, stop_rx) = watch::channel(false);
        self.phase.send_replace(Phase::Running);
        let task = tokio::spawn(cycle(
            Arc::clone(&self.control),
            pair,
            config,
            stop_rx,
            Arc::clone(&self.phase),
        ));
        self.run = Some(Run {
            pair,
            config,
            stop,
            task,
        });

        info!(
            event = "oscillator.started",
            current = %current.label,
            target = %target.label,
            cycle_secs = config.cycle().as_secs(),
            dwell_secs = config.dwell().as_secs()
        );
        Ok(pair)
    }

    /// Running -> Idle. Returns false if there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        let was_running = self.phase() == Phase::Running;

        if let Some(run) = self.run.take() {
            // Err only means the task already ended.
            let _ = run.stop.send(true);
            self.draining.retain(|task| !task.is_finished());
            self.draining.push(run.task);
        }
        // Only a real transition wakes phase watchers.
        self.phase
            .send_if_modified(|phase| std::mem::replace(phase, Phase::Idle) != Phase::Idle);

        if was_running {
            info!(event = "oscillator.stopped");
        }
        was_running
    }

    /// Stop and wait for any pending focus restoration to finish.
    pub async fn shutdown(&mut self) {
        self.stop();
        for task in std::mem::take(&mut self.draining) {
            if let Err(err) = task.await {
                warn!(event = "oscillator.task_failed", error = %err);
            }
        }
    }
}

async fn cycle(
    control: Arc<dyn WindowControl>,
    pair: WindowPair,
    config: OscillatorConfig,
    mut stop: watch::Receiver<bool>,
    phase: Arc<watch::Sender<Phase>>,
) {
    let mut ticker = time::interval_at(Instant::now() + config.cycle(), config.cycle());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }

        let closed = [pair.target, pair.current]
            .into_iter()
            .find(|handle| !control.is_window(*handle));
        if let Some(handle) = closed {
            warn!(event = "oscillator.window_closed", handle = %handle);
            phase.send_replace(Phase::Idle);
            break;
        }

        swing(control.as_ref(), pair.target, "target");
        time::sleep(config.dwell()).await;
        swing(control.as_ref(), pair.current, "current");
    }

    debug!(event = "oscillator.cycle_ended");
}

/// One forced activation. Failures are transient: logged, never retried.
fn swing(control: &dyn WindowControl, handle: WindowHandle, side: &'static str) {
    match force_to_front(control, handle) {
        Ok(()) => debug!(event = "oscillator.focused", side, handle = %handle),
        Err(err) => debug!(
            event = "oscillator.focus_failed",
            side,
            handle = %handle,
            error = %err
        ),
    }
}
