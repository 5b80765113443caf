//! Snapshot source for the dashboard.
//!
//! Receives simulation snapshots via a tokio watch channel. The clock task
//! pushes a new snapshot after every tick or command; the dashboard polls for
//! the latest one without blocking.

use tokio::sync::watch;

use crate::sim::SimSnapshot;

/// A poll-style receiver of simulation snapshots.
///
/// # Example
///
/// ```
/// use linewatch::sim::{alert, seeded, Simulation, SimulationClock, SimulationParams};
///
/// # tokio_test::block_on(async {
/// let (alerts, _rx) = alert::channel();
/// let sim = Simulation::new(
///     SimulationParams::default(),
///     Box::new(seeded(Some(1))),
///     alerts,
///     chrono::Utc::now(),
/// );
/// let mut handle = SimulationClock::new(sim).start();
/// let mut source = handle.subscribe();
///
/// let first = source.poll().expect("initial snapshot");
/// assert_eq!(first.lines.len(), 8);
/// assert!(source.poll().is_none());
/// handle.stop().await;
/// # });
/// ```
#[derive(Debug)]
pub struct SnapshotSource {
    receiver: watch::Receiver<SimSnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl SnapshotSource {
    pub fn new(receiver: watch::Receiver<SimSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("live: {}", source_description),
            initial_returned: false,
        }
    }

    /// Returns the latest snapshot if it has not been returned yet.
    ///
    /// The first poll always returns the current snapshot.
    pub fn poll(&mut self) -> Option<SimSnapshot> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Wait until a snapshot newer than the last polled one is published.
    ///
    /// The new snapshot stays pending for the next [`poll`](Self::poll).
    /// Returns `false` once the clock has stopped.
    pub async fn changed(&mut self) -> bool {
        self.initial_returned = true;
        if self.receiver.changed().await.is_err() {
            return false;
        }
        self.receiver.mark_changed();
        true
    }

    /// Human-readable description for the status bar.
    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{alert, ScriptedRandom, Simulation, SimulationParams};
    use chrono::Utc;

    fn snapshot_channel() -> (watch::Sender<SimSnapshot>, Simulation) {
        let sim = Simulation::new(
            SimulationParams::default(),
            Box::new(ScriptedRandom::new([0.9, 0.5])),
            alert::AlertSender::disabled(),
            Utc::now(),
        );
        let (tx, _rx) = watch::channel(sim.snapshot(Utc::now()));
        (tx, sim)
    }

    #[test]
    fn test_snapshot_source_poll() {
        let (tx, mut sim) = snapshot_channel();
        let mut source = SnapshotSource::new(tx.subscribe(), "test");

        // Initially returns the current snapshot
        let snapshot = source.poll();
        assert_eq!(snapshot.map(|s| s.tick), Some(0));

        // No change, so poll returns None
        assert!(source.poll().is_none());

        sim.tick(Utc::now());
        tx.send(sim.snapshot(Utc::now())).unwrap();

        let snapshot = source.poll();
        assert_eq!(snapshot.map(|s| s.tick), Some(1));
        assert_eq!(source.description(), "live: test");
    }

    #[tokio::test]
    async fn changed_leaves_snapshot_for_poll() {
        let (tx, mut sim) = snapshot_channel();
        let mut source = SnapshotSource::new(tx.subscribe(), "test");

        sim.tick(Utc::now());
        tx.send(sim.snapshot(Utc::now())).unwrap();

        assert!(source.changed().await);
        assert_eq!(source.poll().map(|s| s.tick), Some(1));
        assert!(source.poll().is_none());

        drop(tx);
        assert!(!source.changed().await);
    }
}
