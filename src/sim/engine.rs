//! Authoritative simulation state and the per-tick transition logic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::alert::{AlertLevel, AlertSender};
use super::line::{Line, LineStatus, Thresholds, Transition};
use super::log::{EventLog, LogEntry, DEFAULT_LOG_CAPACITY};
use super::random::RandomSource;
use super::simulator::{disaster_event, initial_lines, next_voltage};
use crate::error::SimError;

/// Default number of lines simulated.
pub const DEFAULT_LINE_COUNT: usize = 8;
/// Default number of history samples kept per line.
pub const DEFAULT_HISTORY_LEN: usize = 30;

/// Sizing parameters for a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub line_count: usize,
    pub history_len: usize,
    pub log_capacity: usize,
    pub thresholds: Thresholds,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            line_count: DEFAULT_LINE_COUNT,
            history_len: DEFAULT_HISTORY_LEN,
            log_capacity: DEFAULT_LOG_CAPACITY,
            thresholds: Thresholds::default(),
        }
    }
}

/// Result of a manual reset request on an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The line was tripped and is now ON.
    Reset,
    /// The line was already ON; nothing changed.
    NotTripped,
}

/// A consistent, read-only view of the simulation at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SimSnapshot {
    pub lines: Arc<[Line]>,
    pub logs: Vec<LogEntry>,
    pub thresholds: Thresholds,
    pub tick: u64,
    pub taken_at: DateTime<Utc>,
}

impl SimSnapshot {
    pub fn tripped_count(&self) -> usize {
        self.lines.iter().filter(|l| l.status.is_tripped()).count()
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }
}

/// Owns lines, thresholds, the event log and the random source.
///
/// All mutation goes through [`tick`](Simulation::tick) and the command
/// methods. Each call replaces the line set as a whole, so a snapshot taken
/// between calls is always consistent.
pub struct Simulation {
    lines: Arc<[Line]>,
    thresholds: Thresholds,
    log: EventLog,
    rng: Box<dyn RandomSource>,
    alerts: AlertSender,
    history_len: usize,
    ticks: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("lines", &self.lines.len())
            .field("thresholds", &self.thresholds)
            .field("log", &self.log.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Simulation {
    /// Create a simulation with freshly initialised lines at `now`.
    pub fn new(
        params: SimulationParams,
        rng: Box<dyn RandomSource>,
        alerts: AlertSender,
        now: DateTime<Utc>,
    ) -> Self {
        let lines = initial_lines(params.line_count, params.history_len, now);
        Self::with_lines(lines, params, rng, alerts)
    }

    /// Create a simulation over an explicit line set.
    pub fn with_lines(
        lines: Vec<Line>,
        params: SimulationParams,
        rng: Box<dyn RandomSource>,
        alerts: AlertSender,
    ) -> Self {
        Self {
            lines: lines.into(),
            thresholds: params.thresholds,
            log: EventLog::new(params.log_capacity),
            rng,
            alerts,
            history_len: params.history_len,
            ticks: 0,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    /// Capture the current state.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SimSnapshot {
        SimSnapshot {
            lines: Arc::clone(&self.lines),
            logs: self.log.to_vec(),
            thresholds: self.thresholds,
            tick: self.ticks,
            taken_at: now,
        }
    }

    /// Advance every line by one sample.
    ///
    /// Thresholds are read once at the start, so every line in this tick is
    /// judged against the same range. Log entries and alerts are emitted
    /// before the new line set is installed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let thresholds = self.thresholds;
        let current = Arc::clone(&self.lines);
        let mut next = Vec::with_capacity(current.len());

        for line in current.iter() {
            let voltage = next_voltage(line.voltage, &thresholds, self.rng.as_mut());
            next.push(self.advance_line(line, voltage, &thresholds, now));
        }

        self.lines = next.into();
        self.ticks += 1;
        debug!(tick = self.ticks, tripped = self.tripped_count(), "tick complete");
    }

    /// Apply one sample to a line: classify, record history, announce.
    fn advance_line(
        &mut self,
        line: &Line,
        voltage: f64,
        thresholds: &Thresholds,
        now: DateTime<Utc>,
    ) -> Line {
        let (status, transition) = line.status.evaluate(voltage, thresholds);

        let mut updated = line.clone();
        updated.status = status;
        updated.record(voltage, now);

        if let Some(transition) = transition {
            self.announce(&updated, transition, now);
        }
        updated
    }

    /// Operator reset of a line.
    ///
    /// A tripped line goes back ON regardless of its voltage; the next tick
    /// trips it again if the reading is still out of range. Resetting a line
    /// that is already ON changes nothing and records nothing.
    pub fn manual_reset(
        &mut self,
        line_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ResetOutcome, SimError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| SimError::UnknownLine(line_id.to_string()))?;

        let (status, transition) = self.lines[index].status.reset();
        let Some(transition) = transition else {
            debug!(line = line_id, "reset ignored, line not tripped");
            return Ok(ResetOutcome::NotTripped);
        };

        let mut next = self.lines.to_vec();
        next[index].status = status;
        self.announce(&next[index], transition, now);
        self.lines = next.into();
        Ok(ResetOutcome::Reset)
    }

    /// Force roughly half of the lines to an anomalous voltage.
    ///
    /// Returns how many lines had their reading changed.
    pub fn trigger_disaster(&mut self, now: DateTime<Utc>) -> usize {
        let next = disaster_event(&self.lines, &self.thresholds, self.rng.as_mut());
        let affected = next
            .iter()
            .zip(self.lines.iter())
            .filter(|(after, before)| after.voltage != before.voltage)
            .count();

        self.alerts.send(AlertLevel::Warning, "Disaster event simulation triggered!");
        self.log.push(LogEntry::system(now, "DISASTER: System-wide event simulated."));
        warn!(affected, "disaster event triggered");

        self.lines = next.into();
        affected
    }

    /// Replace the thresholds used from the next tick on.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<(), SimError> {
        let thresholds = Thresholds::new(thresholds.min, thresholds.max)?;
        info!(min = thresholds.min, max = thresholds.max, "thresholds updated");
        self.thresholds = thresholds;
        Ok(())
    }

    fn tripped_count(&self) -> usize {
        self.lines.iter().filter(|l| l.status.is_tripped()).count()
    }

    fn announce(&mut self, line: &Line, transition: Transition, now: DateTime<Utc>) {
        let (message, level, alert) = match transition {
            Transition::Tripped => (
                "TRIPPED: Unsafe voltage detected!",
                AlertLevel::Error,
                format!("{} tripped due to unsafe voltage: {}V", line.id, line.voltage),
            ),
            Transition::Restored => (
                "RESTORED: Voltage returned to safe range.",
                AlertLevel::Success,
                format!("{} restored automatically.", line.id),
            ),
            Transition::Reset => (
                "RESET: Manually reset by operator.",
                AlertLevel::Info,
                format!("{} was manually reset.", line.id),
            ),
        };

        match transition {
            Transition::Tripped => warn!(line = %line.id, voltage = line.voltage, "line tripped"),
            _ => info!(line = %line.id, voltage = line.voltage, ?transition, "line back on"),
        }

        self.log.push(LogEntry::for_line(now, &line.id, line.voltage, message));
        self.alerts.send(level, alert);
    }
}

/// Status counts for display.
pub fn status_counts(lines: &[Line]) -> (usize, usize) {
    let tripped = lines.iter().filter(|l| l.status == LineStatus::Tripped).count();
    (lines.len() - tripped, tripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::alert;
    use crate::sim::random::ScriptedRandom;

    fn sim_with(lines: Vec<Line>, draws: Vec<f64>) -> (Simulation, alert::AlertReceiver) {
        let (tx, rx) = alert::channel();
        let sim = Simulation::with_lines(
            lines,
            SimulationParams::default(),
            Box::new(ScriptedRandom::new(draws)),
            tx,
        );
        (sim, rx)
    }

    fn line_at(voltage: f64, status: LineStatus) -> Line {
        let mut line = Line::new("LT-1", "Feeder Line 1", voltage, DEFAULT_HISTORY_LEN, Utc::now());
        line.status = status;
        line
    }

    #[test]
    fn forced_out_of_range_sample_trips_and_logs_once() {
        let (mut sim, mut rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![]);
        let line = sim.lines()[0].clone();
        let updated = sim.advance_line(&line, 300.0, &Thresholds::default(), Utc::now());

        assert_eq!(updated.status, LineStatus::Tripped);
        assert_eq!(updated.voltage, 300.0);
        assert_eq!(sim.log().len(), 1);
        let entry = sim.log().latest().unwrap();
        assert_eq!(entry.line_id.as_deref(), Some("LT-1"));
        assert_eq!(entry.voltage, Some(300.0));
        assert_eq!(entry.message, "TRIPPED: Unsafe voltage detected!");

        let alerts = rx.drain();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[0].message, "LT-1 tripped due to unsafe voltage: 300V");
    }

    #[test]
    fn tick_trips_line_drifting_above_max() {
        // 300 + 0 noise, pulled toward nominal: 300 + (230 - 300) * 0.1 = 293
        let (mut sim, _rx) = sim_with(vec![line_at(300.0, LineStatus::On)], vec![0.9, 0.5]);
        sim.tick(Utc::now());

        let line = &sim.lines()[0];
        assert_eq!(line.voltage, 293.0);
        assert_eq!(line.status, LineStatus::Tripped);
        assert_eq!(sim.log().len(), 1);
    }

    #[test]
    fn sample_on_max_boundary_stays_on() {
        // anomaly, spike, zero magnitude -> exactly max
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![0.0, 0.9, 0.0]);
        sim.set_thresholds(Thresholds::new(180.0, 300.0).unwrap()).unwrap();
        sim.tick(Utc::now());
        assert_eq!(sim.lines()[0].voltage, 300.0);
        assert_eq!(sim.lines()[0].status, LineStatus::On);
        assert!(sim.log().is_empty());
    }

    #[test]
    fn tripped_line_restores_automatically() {
        let (mut sim, mut rx) = sim_with(vec![line_at(230.0, LineStatus::Tripped)], vec![0.9, 0.5]);
        sim.tick(Utc::now());

        assert_eq!(sim.lines()[0].status, LineStatus::On);
        assert_eq!(
            sim.log().latest().map(|e| e.message.as_str()),
            Some("RESTORED: Voltage returned to safe range.")
        );
        assert_eq!(rx.drain()[0].level, AlertLevel::Success);
    }

    #[test]
    fn steady_line_produces_no_events() {
        let (mut sim, mut rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![0.9, 0.5]);
        for _ in 0..5 {
            sim.tick(Utc::now());
        }
        assert!(sim.log().is_empty());
        assert!(rx.drain().is_empty());
        assert_eq!(sim.ticks(), 5);
    }

    #[test]
    fn history_is_capped() {
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![0.9, 0.5]);
        for _ in 0..50 {
            sim.tick(Utc::now());
        }
        assert_eq!(sim.lines()[0].history.len(), DEFAULT_HISTORY_LEN);
    }

    #[test]
    fn manual_reset_of_tripped_line_ignores_voltage() {
        let (mut sim, mut rx) = sim_with(vec![line_at(300.0, LineStatus::Tripped)], vec![0.9, 0.5]);
        let outcome = sim.manual_reset("LT-1", Utc::now()).unwrap();

        assert_eq!(outcome, ResetOutcome::Reset);
        assert_eq!(sim.lines()[0].status, LineStatus::On);
        assert_eq!(sim.lines()[0].voltage, 300.0);
        let entry = sim.log().latest().unwrap();
        assert_eq!(entry.message, "RESET: Manually reset by operator.");
        assert_eq!(entry.voltage, Some(300.0));
        assert_eq!(rx.drain()[0].level, AlertLevel::Info);

        // still out of range, so the next tick trips it again
        sim.tick(Utc::now());
        assert_eq!(sim.lines()[0].status, LineStatus::Tripped);
    }

    #[test]
    fn manual_reset_of_on_line_is_noop() {
        let (mut sim, mut rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![]);
        let outcome = sim.manual_reset("LT-1", Utc::now()).unwrap();
        assert_eq!(outcome, ResetOutcome::NotTripped);
        assert!(sim.log().is_empty());
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn manual_reset_unknown_line_errors() {
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![]);
        assert_eq!(
            sim.manual_reset("LT-99", Utc::now()),
            Err(SimError::UnknownLine("LT-99".to_string()))
        );
    }

    #[test]
    fn disaster_logs_system_event_and_warns() {
        let (tx, mut rx) = alert::channel();
        let mut sim = Simulation::new(
            SimulationParams::default(),
            Box::new(ScriptedRandom::new([0.9, 0.9])),
            tx,
            Utc::now(),
        );
        let affected = sim.trigger_disaster(Utc::now());

        assert_eq!(affected, 8);
        assert!(sim.lines().iter().all(|l| l.voltage == 280.0));
        let entry = sim.log().latest().unwrap();
        assert!(entry.line_id.is_none());
        assert!(entry.voltage.is_none());
        assert_eq!(entry.message, "DISASTER: System-wide event simulated.");
        assert_eq!(rx.drain()[0].level, AlertLevel::Warning);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![]);
        let err = sim.set_thresholds(Thresholds { min: 300.0, max: 100.0 });
        assert!(err.is_err());
        assert_eq!(sim.thresholds(), Thresholds::default());
    }

    #[test]
    fn snapshot_shares_line_set() {
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![0.9, 0.5]);
        let before = sim.snapshot(Utc::now());
        sim.tick(Utc::now());
        let after = sim.snapshot(Utc::now());

        assert_eq!(before.lines[0].history.len(), 1);
        assert_eq!(after.lines[0].history.len(), 2);
        assert_eq!(after.tick, 1);
    }

    #[test]
    fn snapshot_serializes_shared_lines() {
        let (mut sim, _rx) = sim_with(vec![line_at(230.0, LineStatus::On)], vec![0.9, 0.5]);
        sim.tick(Utc::now());
        let value = serde_json::to_value(sim.snapshot(Utc::now())).unwrap();

        assert_eq!(value["tick"], 1);
        assert_eq!(value["lines"][0]["id"], "LT-1");
        assert_eq!(value["lines"][0]["status"], "ON");
        assert_eq!(value["lines"][0]["history"].as_array().map(|h| h.len()), Some(2));
        assert_eq!(value["thresholds"]["max"], 260.0);
    }

    #[test]
    fn status_counts_splits_on_and_tripped() {
        let lines = vec![line_at(230.0, LineStatus::On), line_at(300.0, LineStatus::Tripped)];
        assert_eq!(status_counts(&lines), (1, 1));
    }
}
