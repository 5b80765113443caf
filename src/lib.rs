//! # linewatch
//!
//! A simulator and terminal dashboard for low-tension (LT) feeder-line
//! voltage monitoring.
//!
//! A fixed set of feeder lines is advanced on a periodic clock. Each tick
//! draws a new voltage per line (bounded noise, occasional anomalies, a pull
//! back toward nominal near the limits), runs the ON/TRIPPED state machine
//! against the operator thresholds, and records history, event log entries
//! and alerts. Operators can reset tripped lines, move the thresholds and
//! fire a system-wide disaster event.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │ events  │───▶│   app    │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (keys)  │    │ (state)  │    │(render) │    │         │ │
//! │  └─────────┘    └──┬────▲──┘    └─────────┘    └─────────┘ │
//! │           commands │    │ snapshots, alerts                 │
//! │                    ▼    │                                   │
//! │  ┌──────────────────────┴──┐                                │
//! │  │ sim::SimulationClock    │◀── tokio interval              │
//! │  │   └─ sim::Simulation    │                                │
//! │  └─────────────────────────┘                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`sim`]**: lines, thresholds, voltage model, event log, alerts, and
//!   the clock task that owns the simulation
//! - **[`source`]**: [`SnapshotSource`], a poll-style view of published state
//! - **[`app`]**, **[`events`]**, **[`ui`]**: dashboard state, key handling
//!   and ratatui rendering
//! - **[`config`]**, **[`logging`]**, **[`export`]**: settings, tracing setup
//!   and JSON export
//!
//! ## Usage
//!
//! ### Driving a simulation directly
//!
//! ```
//! use chrono::Utc;
//! use linewatch::sim::{AlertSender, ScriptedRandom, Simulation, SimulationParams};
//!
//! let mut sim = Simulation::new(
//!     SimulationParams::default(),
//!     Box::new(ScriptedRandom::new([0.5])),
//!     AlertSender::disabled(),
//!     Utc::now(),
//! );
//! sim.tick(Utc::now());
//! assert_eq!(sim.lines().len(), 8);
//! assert!(sim.lines().iter().all(|l| l.voltage == 230.0));
//! ```
//!
//! ### Running the clock
//!
//! ```
//! use chrono::Utc;
//! use linewatch::sim::{alert, seeded, Simulation, SimulationClock, SimulationParams};
//!
//! # tokio_test::block_on(async {
//! let (alerts, _alert_rx) = alert::channel();
//! let rng = Box::new(seeded(Some(7)));
//! let sim = Simulation::new(SimulationParams::default(), rng, alerts, Utc::now());
//!
//! let mut clock = SimulationClock::new(sim).start();
//! clock.trigger_disaster().unwrap();
//! let final_state = clock.stop().await;
//! assert!(final_state.is_some());
//! # });
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod sim;
pub mod source;
pub mod ui;

pub use app::App;
pub use config::Settings;
pub use error::SimError;
pub use sim::{
    ClockHandle, Line, LineStatus, LogEntry, SimSnapshot, Simulation, SimulationClock, Thresholds,
};
pub use source::SnapshotSource;
