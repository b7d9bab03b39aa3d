//! Session change notifications.
//!
//! The manager broadcasts [`SessionEvent`]s over a `tokio::sync::broadcast`
//! channel, so any number of UI parts can listen without the manager knowing
//! about them.
//!
//! ## Learning: Events as Values
//!
//! A callback slot holds one listener, and replacing it silently drops the old
//! one. A broadcast channel hands every subscriber its own clone of each event:
//!
//! - Subscribers never borrow the manager
//! - A slow subscriber lags instead of blocking the sender
//! - Dropping a receiver is the whole unsubscribe story

use crate::session::SessionId;
use tokio::sync::broadcast;

/// Events emitted by the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was created
    Opened(SessionId),
    /// A session became the active one
    Switched(SessionId),
    /// A session was closed
    Closed(SessionId),
    /// A session's name or location changed
    Renamed(SessionId),
    /// A session's unsaved flag changed
    DirtyChanged(SessionId, bool),
    /// The mirror store finished its first-run setup
    StoreReady,
    /// Something about the open-file state changed; redraw
    Updated,
}

/// Event bus for broadcasting session events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for consuming events asynchronously.
pub struct EventHandler {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns every event already queued, without waiting.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
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

        bus.emit(SessionEvent::Updated);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, SessionEvent::Updated);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut first = EventHandler::new(bus.subscribe());
        let mut second = EventHandler::new(bus.subscribe());

        bus.emit(SessionEvent::StoreReady);

        assert_eq!(first.next().await, Some(SessionEvent::StoreReady));
        assert_eq!(second.drain(), vec![SessionEvent::StoreReady]);
    }
}
