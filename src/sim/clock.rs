//! Periodic driver for the simulation.
//!
//! A single tokio task owns the [`Simulation`]. It advances it on a fixed
//! interval and applies operator commands between ticks, so a tick and a
//! command never run at the same time. After every change the task publishes
//! a fresh [`SimSnapshot`] on a watch channel.
//!
//! ```text
//!  ClockHandle ──Command──▶ ┌──────────────┐ ──SimSnapshot──▶ SnapshotSource
//!              ──stop─────▶ │  clock task  │
//!                           │ (Simulation) │ ──Alert────────▶ AlertReceiver
//!                           └──────────────┘
//! ```

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::engine::{ResetOutcome, SimSnapshot, Simulation};
use super::line::Thresholds;
use crate::error::SimError;
use crate::source::SnapshotSource;

/// Default interval between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1500);

/// Operator commands applied on the clock task.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetThresholds(Thresholds),
    ManualReset(String),
    TriggerDisaster,
}

/// Builder for the clock task.
#[derive(Debug)]
pub struct SimulationClock {
    simulation: Simulation,
    interval: Duration,
}

impl SimulationClock {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Set the tick interval. Zero is raised to one millisecond.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Spawn the clock task on the current tokio runtime.
    ///
    /// The first tick fires one interval after start. If ticks fall behind
    /// they are skipped rather than run in a burst.
    pub fn start(self) -> ClockHandle {
        let SimulationClock { mut simulation, interval } = self;

        let (snapshot_tx, snapshot_rx) = watch::channel(simulation.snapshot(Utc::now()));
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        info!(
            interval_ms = interval.as_millis() as u64,
            lines = simulation.lines().len(),
            "simulation clock started"
        );

        let task = tokio::spawn(async move {
            let mut timer = time::interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;

                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    Some(command) = command_rx.recv() => {
                        apply(&mut simulation, command);
                        snapshot_tx.send_replace(simulation.snapshot(Utc::now()));
                    }
                    _ = timer.tick() => {
                        simulation.tick(Utc::now());
                        snapshot_tx.send_replace(simulation.snapshot(Utc::now()));
                    }
                }
            }

            info!(ticks = simulation.ticks(), "simulation clock stopped");
            simulation
        });

        ClockHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            stop_tx,
            task: Some(task),
        }
    }
}

fn apply(simulation: &mut Simulation, command: Command) {
    debug!(?command, "applying command");
    let now = Utc::now();
    match command {
        Command::SetThresholds(thresholds) => {
            if let Err(e) = simulation.set_thresholds(thresholds) {
                warn!(error = %e, "threshold update rejected");
            }
        }
        Command::ManualReset(line_id) => match simulation.manual_reset(&line_id, now) {
            Ok(ResetOutcome::Reset) => {}
            Ok(ResetOutcome::NotTripped) => debug!(line = %line_id, "line was not tripped"),
            Err(e) => warn!(error = %e, "manual reset failed"),
        },
        Command::TriggerDisaster => {
            simulation.trigger_disaster(now);
        }
    }
}

/// Handle to a running clock.
///
/// Dropping the handle cancels the task. Use [`stop`](ClockHandle::stop) to
/// cancel and wait for it to finish.
#[derive(Debug)]
pub struct ClockHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SimSnapshot>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<Simulation>>,
}

impl ClockHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> SimSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A poll-style receiver of snapshot updates.
    pub fn subscribe(&self) -> SnapshotSource {
        SnapshotSource::new(self.snapshots.clone(), "simulation")
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Replace the thresholds. Invalid ranges are refused here, before
    /// reaching the clock task.
    pub fn set_thresholds(&self, thresholds: Thresholds) -> Result<(), SimError> {
        let thresholds = Thresholds::new(thresholds.min, thresholds.max)?;
        self.send(Command::SetThresholds(thresholds))
    }

    pub fn manual_reset(&self, line_id: &str) -> Result<(), SimError> {
        self.send(Command::ManualReset(line_id.to_string()))
    }

    pub fn trigger_disaster(&self) -> Result<(), SimError> {
        self.send(Command::TriggerDisaster)
    }

    fn send(&self, command: Command) -> Result<(), SimError> {
        if self.task.is_none() {
            return Err(SimError::Stopped);
        }
        self.commands.send(command).map_err(|_| SimError::Stopped)
    }

    /// Stop the clock and wait for the task to exit.
    ///
    /// No tick runs after this returns. The first call yields the final
    /// simulation state; later calls do nothing and return `None`.
    pub async fn stop(&mut self) -> Option<Simulation> {
        let task = self.task.take()?;
        let _ = self.stop_tx.send(true);
        match task.await {
            Ok(simulation) => Some(simulation),
            Err(e) => {
                warn!(error = %e, "simulation clock task ended abnormally");
                None
            }
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.stop_tx.send(true);
            task.abort();
        }
    }
}
