use tokio::sync::broadcast;
use tracing::debug;

use chronocode_shared::constants::PRESENCE_CHANNEL_CAPACITY;
use chronocode_shared::protocol::PresenceMessage;

/// Receives every presence message the registry emits.
///
/// Called after the mutation it describes has been applied, while that
/// room's lock is still held. Implementations must not block or call back
/// into the registry.
pub trait PresenceSink: Send + Sync {
    fn publish(&self, message: &PresenceMessage);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresenceSink for NullSink {
    fn publish(&self, _message: &PresenceMessage) {}
}

/// Fans presence messages out to any number of in-process subscribers.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<PresenceMessage>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PresenceMessage> {
        self.sender.subscribe()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(PRESENCE_CHANNEL_CAPACITY)
    }
}

impl PresenceSink for ChannelSink {
    fn publish(&self, message: &PresenceMessage) {
        if self.sender.send(message.clone()).is_err() {
            debug!(
                room = %message.room_id,
                kind = ?message.kind,
                "No presence subscribers, dropping message"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronocode_shared::protocol::PresenceKind;
    use chronocode_shared::types::{RoomId, UserId};

    fn message(kind: PresenceKind) -> PresenceMessage {
        PresenceMessage::new(
            kind,
            UserId::from("u1"),
            RoomId::new(),
            0,
            serde_json::Value::Null,
        )
    }

    #[tokio::test]
    async fn test_channel_sink_fans_out() {
        let sink = ChannelSink::new(8);
        let mut a = sink.subscribe();
        let mut b = sink.subscribe();

        sink.publish(&message(PresenceKind::Chat));

        assert_eq!(a.recv().await.unwrap().kind, PresenceKind::Chat);
        assert_eq!(b.recv().await.unwrap().kind, PresenceKind::Chat);
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let sink = ChannelSink::default();
        sink.publish(&message(PresenceKind::Join));
        NullSink.publish(&message(PresenceKind::Leave));
    }
}
