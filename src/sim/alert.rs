//! Best-effort operator notifications.
//!
//! The simulation pushes one [`Alert`] per state transition or disaster into an
//! unbounded channel. Nothing waits on delivery; if the receiver is gone the
//! alert is dropped.

use std::time::Instant;

use tokio::sync::mpsc;

/// Severity of an alert, used to pick its display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Error,
    Success,
    Info,
    Warning,
}

impl AlertLevel {
    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::Error => "ERROR",
            AlertLevel::Success => "OK",
            AlertLevel::Info => "INFO",
            AlertLevel::Warning => "WARN",
        }
    }
}

/// A transient, human-readable notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub raised_at: Instant,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }
}

/// Sending half of the alert channel.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: Option<mpsc::UnboundedSender<Alert>>,
}

impl AlertSender {
    /// A sender that discards everything. Used by headless runs.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Fire and forget.
    pub fn send(&self, level: AlertLevel, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(Alert::new(level, message));
        }
    }
}

/// Receiving half of the alert channel.
#[derive(Debug)]
pub struct AlertReceiver {
    rx: mpsc::UnboundedReceiver<Alert>,
}

impl AlertReceiver {
    /// Take every alert queued so far without blocking.
    pub fn drain(&mut self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        while let Ok(alert) = self.rx.try_recv() {
            alerts.push(alert);
        }
        alerts
    }
}

/// Create a connected alert sender/receiver pair.
pub fn channel() -> (AlertSender, AlertReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (AlertSender { tx: Some(tx) }, AlertReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_alerts_in_order() {
        let (tx, mut rx) = channel();
        tx.send(AlertLevel::Error, "LT-1 tripped");
        tx.send(AlertLevel::Success, "LT-1 restored");

        let alerts = rx.drain();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[1].message, "LT-1 restored");
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn send_after_receiver_dropped_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        tx.send(AlertLevel::Info, "nobody listening");
    }

    #[test]
    fn disabled_sender_discards() {
        AlertSender::disabled().send(AlertLevel::Warning, "dropped");
    }
}
