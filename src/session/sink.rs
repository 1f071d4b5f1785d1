use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::info;

use super::OutputSnapshot;

/// Notifications delivered to a session transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Intermediate state while agents are still working
    Update(OutputSnapshot),
    /// Final state; sent once per output message
    Published(OutputSnapshot),
}

impl SessionEvent {
    pub fn snapshot(&self) -> &OutputSnapshot {
        match self {
            Self::Update(s) | Self::Published(s) => s,
        }
    }
}

/// Transport that carries output-message state to whoever is watching the session
pub trait MessageSink: Send + Sync {
    fn send(&self, event: SessionEvent);
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MessageSink for NoopSink {
    fn send(&self, _event: SessionEvent) {}
}

/// Writes the newest action and final status through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn send(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Update(s) => {
                if let Some(action) = s.actions.last() {
                    info!(session_id = %s.session_id, action = %action, "session update");
                }
            }
            SessionEvent::Published(s) => {
                info!(session_id = %s.session_id, status = %s.status, "session published");
            }
        }
    }
}

/// Forwards events over a tokio channel.
///
/// Sends are best-effort: when the receiver lags or is gone the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<SessionEvent>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<SessionEvent>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl MessageSink for ChannelSink {
    fn send(&self, event: SessionEvent) {
        let _ = self.sender.try_send(event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Only the terminal events
    pub fn published(&self) -> Vec<OutputSnapshot> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Published(s) => Some(s),
                SessionEvent::Update(_) => None,
            })
            .collect()
    }
}

impl MessageSink for RecordingSink {
    fn send(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::channel(8);
        let mut snapshot = OutputSnapshot::default();
        sink.send(SessionEvent::Update(snapshot.clone()));
        snapshot.actions.push("done".to_string());
        sink.send(SessionEvent::Published(snapshot));

        assert!(matches!(rx.recv().await, Some(SessionEvent::Update(_))));
        let last = rx.recv().await.unwrap();
        assert_eq!(last.snapshot().actions, vec!["done".to_string()]);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (sink, _rx) = ChannelSink::channel(1);
        sink.send(SessionEvent::Update(OutputSnapshot::default()));
        // Second send would block; it is dropped instead
        sink.send(SessionEvent::Update(OutputSnapshot::default()));
    }
}
