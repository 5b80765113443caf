//! Voltage generation: random walk, anomalies, and disaster events.

use chrono::{DateTime, Utc};

use super::line::{Line, Thresholds};
use super::random::RandomSource;

/// Reference voltage lines start at and drift back toward.
pub const NOMINAL_VOLTAGE: f64 = 230.0;
/// Half-width of the per-tick noise.
pub const MAX_FLUCTUATION: f64 = 5.0;
/// Chance per sample of an anomalous spike or drop.
pub const ANOMALY_PROBABILITY: f64 = 0.02;
/// Maximum distance an anomaly lands beyond a threshold.
pub const ANOMALY_SPAN: f64 = 30.0;
/// Distance from a threshold inside which mean reversion applies.
pub const RECOVERY_BAND: f64 = 10.0;
/// Fraction of the gap to nominal recovered per sample.
pub const RECOVERY_RATE: f64 = 0.1;
/// Distance beyond a threshold that a disaster forces a line to.
pub const DISASTER_OFFSET: f64 = 20.0;

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compute the next voltage sample for a line.
///
/// Draw order: the first draw selects the anomaly branch (`< 0.02`). An
/// anomaly then draws a direction (`> 0.5` spikes above `max`, otherwise
/// drops below `min`) and a magnitude in `[0, 30)`. A normal sample draws one
/// noise value in `[-5, 5)` and is pulled 10% toward nominal when it lands
/// within 10 V of either threshold.
///
/// ```
/// use linewatch::sim::{next_voltage, ScriptedRandom, Thresholds};
///
/// // No anomaly (0.9), zero noise (0.5).
/// let mut rng = ScriptedRandom::new([0.9, 0.5]);
/// assert_eq!(next_voltage(230.0, &Thresholds::default(), &mut rng), 230.0);
/// ```
pub fn next_voltage(current: f64, thresholds: &Thresholds, rng: &mut dyn RandomSource) -> f64 {
    if rng.next_unit() < ANOMALY_PROBABILITY {
        let spike = rng.next_unit() > 0.5;
        let magnitude = rng.uniform(0.0, ANOMALY_SPAN);
        let voltage = if spike {
            thresholds.max + magnitude
        } else {
            thresholds.min - magnitude
        };
        return round2(voltage);
    }

    let mut candidate = current + rng.uniform(-MAX_FLUCTUATION, MAX_FLUCTUATION);
    if candidate > thresholds.max - RECOVERY_BAND || candidate < thresholds.min + RECOVERY_BAND {
        candidate += (NOMINAL_VOLTAGE - candidate) * RECOVERY_RATE;
    }
    round2(candidate)
}

/// Force roughly half the lines to an anomalous voltage.
///
/// Each line independently draws `> 0.5` to be affected; an affected line
/// then draws `> 0.5` to go to `max + 20`, otherwise `min - 20`. Status is
/// left alone so the next tick classifies the forced reading.
pub fn disaster_event(
    lines: &[Line],
    thresholds: &Thresholds,
    rng: &mut dyn RandomSource,
) -> Vec<Line> {
    lines
        .iter()
        .map(|line| {
            if rng.next_unit() > 0.5 {
                let voltage = if rng.next_unit() > 0.5 {
                    thresholds.max + DISASTER_OFFSET
                } else {
                    thresholds.min - DISASTER_OFFSET
                };
                Line {
                    voltage: round2(voltage),
                    ..line.clone()
                }
            } else {
                line.clone()
            }
        })
        .collect()
}

/// Create `count` lines `LT-1..LT-count`, all ON at nominal voltage.
pub fn initial_lines(count: usize, history_capacity: usize, now: DateTime<Utc>) -> Vec<Line> {
    (1..=count)
        .map(|i| {
            Line::new(
                format!("LT-{}", i),
                format!("Feeder Line {}", i),
                NOMINAL_VOLTAGE,
                history_capacity,
                now,
            )
        })
        .collect()
}
