//! # Stage Events
//!
//! Registry watchers and the selection source push events; the stage drains
//! them in order.
//!
//! ```text
//! ┌──────────────────┐
//! │ registry watcher │──┐   ConfigUpdated / Removed
//! └──────────────────┘  │
//!                       ├──▶ [ EventBus ] ──▶ Stage::pump()
//! ┌──────────────────┐  │
//! │ selection source │──┘   Selected
//! └──────────────────┘
//! ```

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use stage_shared::{EntityConfig, EntityId};

/// Something the stage has to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    /// The registry published a new snapshot of a unit.
    ConfigUpdated(EntityConfig),

    /// A unit disappeared from the registry.
    Removed(EntityId),

    /// A unit was selected with some probability.
    Selected {
        /// Selected unit.
        unit_id: EntityId,
        /// Detection strength in `[0, 1]`.
        probability: f64,
    },
}

/// Bounded multi-producer event channel.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<StageEvent>,
    receiver: Receiver<StageEvent>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` pending events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for sending events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<StageEvent>,
}

impl EventSender {
    /// Sends without blocking.
    ///
    /// Returns `false` when the bus is full or the stage is gone; the event
    /// is dropped.
    pub fn send(&self, event: StageEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "event bus full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Sends, waiting for room when the bus is full.
    ///
    /// Returns `false` when the stage is gone.
    pub fn send_blocking(&self, event: StageEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Handle for receiving events.
#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<StageEvent>,
}

impl EventReceiver {
    /// Takes every pending event, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<StageEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one pending event.
    #[must_use]
    pub fn try_recv(&self) -> Option<StageEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_order() {
        let bus = EventBus::new(8);
        let tx = bus.sender();
        let rx = bus.receiver();

        assert!(tx.send(StageEvent::ConfigUpdated(EntityConfig::object("a"))));
        assert!(tx.send(StageEvent::Removed("a".into())));
        assert_eq!(rx.pending_count(), 2);

        let events = rx.drain();
        assert!(matches!(events[0], StageEvent::ConfigUpdated(_)));
        assert!(matches!(events[1], StageEvent::Removed(_)));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_full_bus_refuses() {
        let bus = EventBus::new(1);
        let tx = bus.sender();
        let selected = StageEvent::Selected {
            unit_id: "cup".into(),
            probability: 0.7,
        };
        assert!(tx.send(selected.clone()));
        assert!(!tx.send(selected));
        assert_eq!(bus.receiver().pending_count(), 1);
    }
}
