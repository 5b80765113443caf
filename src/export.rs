//! JSON export of simulation state.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use tracing::info;

use crate::config::Settings;
use crate::sim::{alert::AlertSender, seeded, status_counts, SimSnapshot, Simulation};

/// Build the export document for a snapshot.
pub fn snapshot_json(snapshot: &SimSnapshot) -> serde_json::Value {
    let (on, tripped) = status_counts(&snapshot.lines);
    json!({
        "summary": {
            "total_lines": snapshot.lines.len(),
            "on": on,
            "tripped": tripped,
            "tick": snapshot.tick,
            "taken_at": snapshot.taken_at,
        },
        "thresholds": snapshot.thresholds,
        "lines": snapshot.lines,
        "logs": snapshot.logs,
    })
}

/// Write a snapshot to `path` as pretty-printed JSON.
pub fn write_snapshot(snapshot: &SimSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&snapshot_json(snapshot))?;
    let mut file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Run `ticks` steps without a clock or terminal and return the final state.
///
/// Sample times advance by the configured interval from the start time, so
/// the exported history looks like a live run.
pub fn run_headless(settings: &Settings, ticks: u64) -> Result<SimSnapshot> {
    settings.validate()?;
    let params = settings.simulation_params()?;
    let start = Utc::now();
    let step = i64::try_from(settings.tick_interval_ms)
        .ok()
        .and_then(ChronoDuration::try_milliseconds)
        .context("tick interval out of range")?;

    let mut simulation = Simulation::new(
        params,
        Box::new(seeded(settings.seed)),
        AlertSender::disabled(),
        start,
    );
    let mut now = start;
    for tick in 0..ticks {
        now = now
            .checked_add_signed(step)
            .with_context(|| format!("sample time overflowed at tick {}", tick + 1))?;
        simulation.tick(now);
    }

    let snapshot = simulation.snapshot(now);
    info!(ticks, tripped = snapshot.tripped_count(), "headless run complete");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            seed: Some(42),
            ..Settings::default()
        }
    }

    #[test]
    fn headless_run_is_reproducible_with_seed() {
        let a = run_headless(&settings(), 50).unwrap();
        let b = run_headless(&settings(), 50).unwrap();

        let voltages = |s: &SimSnapshot| s.lines.iter().map(|l| l.voltage).collect::<Vec<_>>();
        assert_eq!(voltages(&a), voltages(&b));
        assert_eq!(a.tick, 50);
        assert!(a.lines.iter().all(|l| l.history.len() == 30));
    }

    #[test]
    fn oversized_interval_is_an_error() {
        let settings = Settings {
            tick_interval_ms: 1_000_000_000_000_000,
            ..settings()
        };
        assert!(run_headless(&settings, 100).is_err());
    }

    #[test]
    fn longest_interval_runs_many_ticks() {
        let settings = Settings {
            tick_interval_ms: crate::config::MAX_TICK_INTERVAL_MS,
            ..settings()
        };
        let snapshot = run_headless(&settings, 1000).unwrap();
        let history = &snapshot.lines[0].history;
        let span = history.back().unwrap().time - history.front().unwrap().time;
        assert_eq!(span.num_days(), 29);
    }

    #[test]
    fn export_writes_summary_and_lines() {
        let snapshot = run_headless(&settings(), 3).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        write_snapshot(&snapshot, &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["summary"]["total_lines"], 8);
        assert_eq!(value["summary"]["tick"], 3);
        assert_eq!(value["thresholds"]["min"], 180.0);
        assert_eq!(value["lines"][0]["id"], "LT-1");
        assert_eq!(value["lines"][0]["history"].as_array().map(|h| h.len()), Some(4));
    }
}
