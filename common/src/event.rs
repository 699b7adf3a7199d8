//! Notifications emitted on real state changes.
//!
//! The core only promises ordering and exactly-once emission per effective
//! mutation. Delivery is left to whatever `EventSink` the host plugs in.

use log::info;
use serde::{Deserialize, Serialize};

use crate::access_control::RoleId;
use crate::crypto::Address;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RoleGranted {
        #[serde(with = "hex::serde")]
        role: RoleId,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        #[serde(with = "hex::serde")]
        role: RoleId,
        account: Address,
        sender: Address,
    },
    RoleAdminChanged {
        #[serde(with = "hex::serde")]
        role: RoleId,
        #[serde(with = "hex::serde")]
        previous_admin_role: RoleId,
        #[serde(with = "hex::serde")]
        new_admin_role: RoleId,
    },
    Snapshot {
        id: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        value: u64,
    },
    DelegateChanged {
        delegator: Address,
        from_delegate: Address,
        to_delegate: Address,
    },
    DelegateVotesChanged {
        delegate: Address,
        previous_balance: u64,
        new_balance: u64,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RoleGranted { .. } => "RoleGranted",
            Event::RoleRevoked { .. } => "RoleRevoked",
            Event::RoleAdminChanged { .. } => "RoleAdminChanged",
            Event::Snapshot { .. } => "Snapshot",
            Event::Transfer { .. } => "Transfer",
            Event::DelegateChanged { .. } => "DelegateChanged",
            Event::DelegateVotesChanged { .. } => "DelegateVotesChanged",
        }
    }
}

/// Receiver of emitted events, registered by the host
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: Event) {
        (**self).emit(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, event: Event) {
        (**self).emit(event)
    }
}

// Collecting sink, mostly for tests and batch hosts
impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _: Event) {}
}

/// Sink that writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: Event) {
        info!("{}: {:?}", event.kind(), event);
    }
}

#[cfg(feature = "tokio")]
impl EventSink for tokio::sync::mpsc::UnboundedSender<Event> {
    fn emit(&mut self, event: Event) {
        if let Err(e) = self.send(event) {
            log::warn!("Event receiver dropped, discarding {}", e.0.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<Event> = Vec::new();
        sink.emit(Event::Snapshot { id: 1 });
        sink.emit(Event::Snapshot { id: 2 });
        assert_eq!(
            sink,
            vec![Event::Snapshot { id: 1 }, Event::Snapshot { id: 2 }]
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::RoleAdminChanged {
            role: [1u8; 32],
            previous_admin_role: [0u8; 32],
            new_admin_role: [2u8; 32],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "role_admin_changed");
        assert_eq!(json["role"], hex::encode([1u8; 32]));
        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_log_and_null_sinks_accept_events() {
        let mut sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LogSink), Box::new(NullSink)];
        for sink in sinks.iter_mut() {
            sink.emit(Event::Snapshot { id: 3 });
        }
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_channel_sink() {
        let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.emit(Event::Snapshot { id: 7 });
        assert_eq!(rx.recv().await, Some(Event::Snapshot { id: 7 }));

        drop(rx);
        // Closed receiver must not panic
        tx.emit(Event::Snapshot { id: 8 });
    }
}
