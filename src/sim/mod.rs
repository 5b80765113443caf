//! Feeder-line simulation core.
//!
//! ## Submodules
//!
//! - [`simulator`]: voltage random walk, anomalies, disaster events, initial lines
//! - [`line`]: [`Line`], [`Thresholds`] and the ON/TRIPPED state machine
//! - [`engine`]: [`Simulation`], the owner of all mutable state
//! - [`clock`]: [`SimulationClock`], the periodic task driving the engine
//! - [`log`], [`alert`]: event log and operator notifications
//! - [`buffer`], [`random`]: bounded buffers and injectable randomness
//!
//! ## Data Flow
//!
//! ```text
//! timer tick / operator command
//!        │
//!        ▼
//! Simulation::tick() ──▶ next_voltage() per line
//!        │                      │
//!        │                      ▼
//!        │              LineStatus::evaluate()
//!        │                      │
//!        │                      ├──▶ EventLog::push()
//!        │                      └──▶ AlertSender::send()
//!        ▼
//! SimSnapshot (published)
//! ```

pub mod alert;
pub mod buffer;
pub mod clock;
pub mod engine;
pub mod line;
pub mod log;
pub mod random;
pub mod simulator;

pub use alert::{Alert, AlertLevel, AlertReceiver, AlertSender};
pub use buffer::BoundedBuffer;
pub use clock::{ClockHandle, Command, SimulationClock, DEFAULT_TICK_INTERVAL};
pub use engine::{
    status_counts, ResetOutcome, SimSnapshot, Simulation, SimulationParams, DEFAULT_HISTORY_LEN,
    DEFAULT_LINE_COUNT,
};
pub use line::{Line, LineStatus, Sample, Thresholds, Transition};
pub use log::{EventLog, LogEntry, DEFAULT_LOG_CAPACITY};
pub use random::{seeded, RandomSource, ScriptedRandom};
pub use simulator::{disaster_event, initial_lines, next_voltage, round2, NOMINAL_VOLTAGE};
