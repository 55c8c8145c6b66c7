//! Event system for editor notifications.
//!
//! The editor owns its `EventBus` and hands out receivers; hosts subscribe
//! explicitly instead of listening on a global channel. Events are values,
//! and a host that falls behind loses old events rather than blocking the
//! editor.

use tokio::sync::broadcast;

use crate::resolver::ContextRequest;
use crate::suggestion::IdMapping;

/// Events the editor reports to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The text changed through an accepted suggestion
    TextChanged { text: String },
    /// An identifier-bearing suggestion was inserted under its label
    IdMapping(IdMapping),
    /// A contextual pool is needed for the current trigger
    ContextRequested(ContextRequest),
    /// The popup opened or its options changed
    PopupShown { count: usize },
    /// The popup closed
    PopupHidden,
    /// Where the host should put the caret after a splice
    CaretRestored(usize),
}

/// Event bus for broadcasting editor events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for consuming events.
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns every event already queued, without waiting.
    ///
    /// The editor emits synchronously, so after a call into it this
    /// yields everything that call produced.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return events,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::PopupHidden);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::PopupHidden);
    }

    #[tokio::test]
    async fn test_handler_next_and_closed() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        bus.emit(EditorEvent::CaretRestored(3));
        assert_eq!(handler.next().await, Some(EditorEvent::CaretRestored(3)));
        drop(bus);
        assert_eq!(handler.next().await, None);
    }

    #[test]
    fn test_drain_returns_queued_events() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        bus.emit(EditorEvent::PopupShown { count: 2 });
        bus.emit(EditorEvent::PopupHidden);
        assert_eq!(
            handler.drain(),
            vec![EditorEvent::PopupShown { count: 2 }, EditorEvent::PopupHidden]
        );
        assert!(handler.drain().is_empty());
    }
}
