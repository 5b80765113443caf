//! Feeder line model and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::buffer::BoundedBuffer;
use crate::error::SimError;

/// Safe operating range for line voltage.
///
/// A sample is safe when it lies within `[min, max]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min: f64,
    pub max: f64,
}

impl Thresholds {
    /// Validated constructor: both bounds finite and `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self, SimError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(SimError::InvalidThresholds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns true if `voltage` lies within the safe range.
    pub fn contains(&self, voltage: f64) -> bool {
        voltage >= self.min && voltage <= self.max
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min: 180.0,
            max: 260.0,
        }
    }
}

/// Operating status of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    On,
    Tripped,
}

/// A status change produced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// ON -> TRIPPED on an out-of-range sample.
    Tripped,
    /// TRIPPED -> ON when the voltage came back in range.
    Restored,
    /// TRIPPED -> ON by operator command.
    Reset,
}

impl LineStatus {
    /// Classify a new sample against the current thresholds.
    ///
    /// Returns the next status and the transition taken, if any. Only
    /// ON -> TRIPPED and TRIPPED -> ON are possible; otherwise the status is
    /// unchanged.
    pub fn evaluate(
        self,
        voltage: f64,
        thresholds: &Thresholds,
    ) -> (LineStatus, Option<Transition>) {
        let safe = thresholds.contains(voltage);
        match (self, safe) {
            (LineStatus::On, false) => (LineStatus::Tripped, Some(Transition::Tripped)),
            (LineStatus::Tripped, true) => (LineStatus::On, Some(Transition::Restored)),
            (status, _) => (status, None),
        }
    }

    /// Apply an operator reset. Only a tripped line changes.
    pub fn reset(self) -> (LineStatus, Option<Transition>) {
        match self {
            LineStatus::Tripped => (LineStatus::On, Some(Transition::Reset)),
            LineStatus::On => (LineStatus::On, None),
        }
    }

    /// Display label, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            LineStatus::On => "ON",
            LineStatus::Tripped => "TRIPPED",
        }
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self, LineStatus::Tripped)
    }
}

/// One voltage reading in a line's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub voltage: f64,
}

/// A simulated feeder line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub id: String,
    pub name: String,
    pub status: LineStatus,
    pub voltage: f64,
    pub history: BoundedBuffer<Sample>,
}

impl Line {
    /// Create a line in the ON state with a single history sample at `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        voltage: f64,
        history_capacity: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let mut history = BoundedBuffer::new(history_capacity);
        history.push_back(Sample { time: now, voltage });
        Self {
            id: id.into(),
            name: name.into(),
            status: LineStatus::On,
            voltage,
            history,
        }
    }

    /// Append a sample, keeping history in time order.
    ///
    /// A `time` earlier than the newest sample is clamped to it.
    pub fn record(&mut self, voltage: f64, time: DateTime<Utc>) {
        let time = match self.history.back() {
            Some(last) if last.time > time => last.time,
            _ => time,
        };
        self.voltage = voltage;
        self.history.push_back(Sample { time, voltage });
    }

    /// Lowest and highest voltage in the retained history.
    pub fn history_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.history.iter().map(|s| s.voltage);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn limits() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn on_trips_when_out_of_range() {
        assert_eq!(
            LineStatus::On.evaluate(300.0, &limits()),
            (LineStatus::Tripped, Some(Transition::Tripped))
        );
        assert_eq!(
            LineStatus::On.evaluate(179.99, &limits()),
            (LineStatus::Tripped, Some(Transition::Tripped))
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(LineStatus::On.evaluate(180.0, &limits()), (LineStatus::On, None));
        assert_eq!(LineStatus::On.evaluate(260.0, &limits()), (LineStatus::On, None));
    }

    #[test]
    fn tripped_restores_when_back_in_range() {
        assert_eq!(
            LineStatus::Tripped.evaluate(230.0, &limits()),
            (LineStatus::On, Some(Transition::Restored))
        );
        assert_eq!(LineStatus::Tripped.evaluate(270.0, &limits()), (LineStatus::Tripped, None));
    }

    #[test]
    fn reset_only_changes_tripped() {
        assert_eq!(LineStatus::Tripped.reset(), (LineStatus::On, Some(Transition::Reset)));
        assert_eq!(LineStatus::On.reset(), (LineStatus::On, None));
    }

    #[test]
    fn thresholds_reject_inverted_or_non_finite() {
        assert!(Thresholds::new(180.0, 260.0).is_ok());
        assert_eq!(
            Thresholds::new(260.0, 180.0),
            Err(SimError::InvalidThresholds { min: 260.0, max: 180.0 })
        );
        assert!(Thresholds::new(200.0, 200.0).is_err());
        assert!(Thresholds::new(f64::NAN, 200.0).is_err());
        assert!(Thresholds::new(100.0, f64::INFINITY).is_err());
    }

    #[test]
    fn record_clamps_backwards_time() {
        let t0 = Utc::now();
        let mut line = Line::new("LT-1", "Feeder Line 1", 230.0, 30, t0);
        line.record(231.0, t0 - Duration::seconds(5));
        let times: Vec<_> = line.history.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![t0, t0]);
        assert_eq!(line.voltage, 231.0);
    }

    #[test]
    fn history_range_spans_samples() {
        let t0 = Utc::now();
        let mut line = Line::new("LT-1", "Feeder Line 1", 230.0, 30, t0);
        line.record(210.5, t0);
        line.record(244.0, t0);
        assert_eq!(line.history_range(), Some((210.5, 244.0)));
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&LineStatus::Tripped).unwrap(), "\"TRIPPED\"");
        assert_eq!(serde_json::to_string(&LineStatus::On).unwrap(), "\"ON\"");
    }
}
