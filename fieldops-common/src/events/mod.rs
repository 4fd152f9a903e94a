//! Event types for the fieldops event system
//!
//! Provides shared event definitions and EventBus for all fieldops crates.

mod save_types;

pub use save_types::{SaveState, SaveStep, StepStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// fieldops event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI (SSE, websocket, log shipping).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldOpsEvent {
    /// A completion submit was accepted and started validating
    SaveStarted {
        session_id: Uuid,
        job_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Save lifecycle state changed
    SaveStateChanged {
        session_id: Uuid,
        old_state: SaveState,
        new_state: SaveState,
        timestamp: DateTime<Utc>,
    },

    /// Progress bar update
    ///
    /// `percentage` never decreases within a session and only reaches 100
    /// after every step has returned.
    SaveProgress {
        session_id: Uuid,
        job_id: String,
        step: SaveStep,
        percentage: u8,
        timestamp: DateTime<Utc>,
    },

    /// One pipeline step returned
    SaveStepFinished {
        session_id: Uuid,
        job_id: String,
        step: SaveStep,
        status: StepStatus,
        timestamp: DateTime<Utc>,
    },

    /// Report assembled and returned to the caller
    SaveCompleted {
        session_id: Uuid,
        job_id: String,
        successes: usize,
        warnings: usize,
        errors: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Submit refused before any side effect (validation, duplicate submit)
    SaveRejected {
        job_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl FieldOpsEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            FieldOpsEvent::SaveStarted { .. } => "SaveStarted",
            FieldOpsEvent::SaveStateChanged { .. } => "SaveStateChanged",
            FieldOpsEvent::SaveProgress { .. } => "SaveProgress",
            FieldOpsEvent::SaveStepFinished { .. } => "SaveStepFinished",
            FieldOpsEvent::SaveCompleted { .. } => "SaveCompleted",
            FieldOpsEvent::SaveRejected { .. } => "SaveRejected",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`. Slow subscribers lose the oldest events
/// once `capacity` is exceeded.
///
/// # Examples
///
/// ```
/// use fieldops_common::events::{EventBus, FieldOpsEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(FieldOpsEvent::SaveRejected {
///     job_id: "JO-1".to_string(),
///     reason: "validation".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FieldOpsEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldOpsEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: FieldOpsEvent,
    ) -> Result<usize, broadcast::error::SendError<FieldOpsEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: FieldOpsEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> FieldOpsEvent {
        FieldOpsEvent::SaveRejected {
            job_id: "JO-7".to_string(),
            reason: "Items are required".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        assert!(bus.emit(rejected()).is_err());
        // lossy variant never panics
        bus.emit_lossy(rejected());
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(rejected()).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "SaveRejected");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(rejected()).unwrap();
        assert_eq!(json["type"], "SaveRejected");
        assert_eq!(json["job_id"], "JO-7");
    }
}
