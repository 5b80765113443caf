//! Application state and operator interaction logic.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::sim::{Alert, AlertLevel, AlertReceiver, ClockHandle, Line, SimSnapshot, Thresholds};
use crate::source::SnapshotSource;
use crate::ui::Theme;

/// How long an alert stays on screen.
pub const ALERT_TTL: Duration = Duration::from_secs(3);
/// Maximum number of alerts kept for the toast stack.
const MAX_ALERTS: usize = 5;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Line table, selected line chart and recent events.
    Lines,
    /// Full event log.
    EventLog,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Lines => View::EventLog,
            View::EventLog => View::Lines,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Lines => "Lines",
            View::EventLog => "Event Log",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    clock: ClockHandle,
    source: SnapshotSource,
    alert_rx: AlertReceiver,
    pub data: Option<SimSnapshot>,
    pub last_updated: Option<Instant>,

    /// Thresholds as entered by the operator.
    pub thresholds: Thresholds,
    pub threshold_step: f64,

    // Navigation state
    pub selected_line_index: usize,
    pub log_scroll: usize,

    // UI
    pub theme: Theme,
    pub alerts: VecDeque<Alert>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App driving the given clock.
    pub fn new(
        clock: ClockHandle,
        alert_rx: AlertReceiver,
        threshold_step: f64,
        theme: Theme,
    ) -> Self {
        let source = clock.subscribe();
        let thresholds = clock.snapshot().thresholds;
        Self {
            running: true,
            current_view: View::Lines,
            show_help: false,
            clock,
            source,
            alert_rx,
            data: None,
            last_updated: None,
            thresholds,
            threshold_step,
            selected_line_index: 0,
            log_scroll: 0,
            theme,
            alerts: VecDeque::new(),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < ALERT_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Alerts raised within the last few seconds, newest first.
    pub fn active_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.raised_at.elapsed() < ALERT_TTL)
    }

    /// Pull the latest snapshot and any queued alerts.
    ///
    /// Returns true if a new snapshot arrived.
    pub fn reload_data(&mut self) -> bool {
        for alert in self.alert_rx.drain() {
            self.push_alert(alert);
        }

        let Some(snapshot) = self.source.poll() else {
            return false;
        };
        if self.selected_line_index >= snapshot.lines.len() {
            self.selected_line_index = snapshot.lines.len().saturating_sub(1);
        }
        if self.log_scroll >= snapshot.logs.len() {
            self.log_scroll = snapshot.logs.len().saturating_sub(1);
        }
        self.data = Some(snapshot);
        self.last_updated = Some(Instant::now());
        true
    }

    fn push_alert(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    fn item_count(&self) -> usize {
        let Some(ref data) = self.data else {
            return 0;
        };
        match self.current_view {
            View::Lines => data.lines.len(),
            View::EventLog => data.logs.len(),
        }
    }

    fn cursor(&mut self) -> &mut usize {
        match self.current_view {
            View::Lines => &mut self.selected_line_index,
            View::EventLog => &mut self.log_scroll,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let cursor = self.cursor();
        *cursor = (*cursor + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let cursor = self.cursor();
        *cursor = cursor.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.cursor() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        *self.cursor() = last;
    }

    /// The line under the cursor in the Lines view.
    pub fn selected_line(&self) -> Option<&Line> {
        self.data.as_ref()?.lines.get(self.selected_line_index)
    }

    /// Manually reset the selected line.
    ///
    /// Only a tripped line is sent to the simulation; otherwise a hint is
    /// shown and nothing happens.
    pub fn reset_selected(&mut self) {
        let Some(line) = self.selected_line() else {
            return;
        };
        if !line.status.is_tripped() {
            let message = format!("{} is not tripped", line.id);
            self.set_status_message(message);
            return;
        }
        let id = line.id.clone();
        if let Err(e) = self.clock.manual_reset(&id) {
            self.set_status_message(format!("Reset failed: {}", e));
        }
    }

    /// Force a system-wide disaster event.
    pub fn trigger_disaster(&mut self) {
        if let Err(e) = self.clock.trigger_disaster() {
            self.set_status_message(format!("Disaster trigger failed: {}", e));
        }
    }

    /// Shift the minimum threshold by `steps` increments.
    pub fn adjust_min(&mut self, steps: f64) {
        let proposed = Thresholds {
            min: self.thresholds.min + steps * self.threshold_step,
            max: self.thresholds.max,
        };
        self.apply_thresholds(proposed);
    }

    /// Shift the maximum threshold by `steps` increments.
    pub fn adjust_max(&mut self, steps: f64) {
        let proposed = Thresholds {
            min: self.thresholds.min,
            max: self.thresholds.max + steps * self.threshold_step,
        };
        self.apply_thresholds(proposed);
    }

    fn apply_thresholds(&mut self, proposed: Thresholds) {
        match self.clock.set_thresholds(proposed) {
            Ok(()) => self.thresholds = proposed,
            Err(e) => self.push_alert(Alert::new(AlertLevel::Warning, e.to_string())),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Stop the simulation clock and wait for it to finish.
    pub async fn shutdown(&mut self) {
        self.clock.stop().await;
    }

    /// Export the current snapshot to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };
        crate::export::write_snapshot(data, path)
    }
}
